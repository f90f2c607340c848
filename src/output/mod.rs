//! Output formatting for CLI results

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod json;
pub mod table;

/// Types that render differently per `--format`
pub trait Formattable {
    fn format(&self, format: OutputFormat) -> Result<String>;
}

/// Format and print data to stdout
pub fn print<T: Formattable>(data: &T, format: OutputFormat) -> Result<()> {
    let output = data.format(format)?;
    println!("{}", output);
    Ok(())
}
