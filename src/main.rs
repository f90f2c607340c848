//! postsync - Keep Postman workspaces in step with OpenAPI specs

use clap::{CommandFactory, Parser};

mod build;
mod cli;
mod client;
mod config;
mod error;
mod output;
mod postman;
mod script;
mod spec;
mod sync;

use cli::args::GlobalOptions;
use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let opts = GlobalOptions::from_cli(&cli);

    match &cli.command {
        Commands::Sync(args) => cli::sync::run(args, &opts).await,
        Commands::Validate { spec } => cli::validate::run(spec, &opts),
        Commands::Render { spec, out } => cli::render::run(spec, out, &opts).map(|_| 0),
        Commands::Script => {
            println!("{}", script::prerequest_source());
            Ok(0)
        }
        Commands::Init => cli::init::run(&opts).map(|_| 0),
        Commands::Status => cli::status::run(&opts).map(|_| 0),
        Commands::Version => {
            println!("postsync version {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Completion { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "postsync", &mut std::io::stdout());
            Ok(0)
        }
    }
}
