//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Rounded table with centered headers, or `empty` when there are no rows.
pub fn format_table<T: Tabled>(data: &[T], empty: &str) -> String {
    if data.is_empty() {
        return empty.to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct Row {
        #[tabled(rename = "KIND")]
        kind: &'static str,
        #[tabled(rename = "NAME")]
        name: &'static str,
    }

    #[test]
    fn test_empty_rows_use_message() {
        let rows: Vec<Row> = vec![];
        assert_eq!(format_table(&rows, "Nothing to sync."), "Nothing to sync.");
    }

    #[test]
    fn test_rows_render_with_headers() {
        let rows = vec![
            Row {
                kind: "collection",
                name: "Refunds v1.0.0",
            },
            Row {
                kind: "environment",
                name: "Refunds - Dev",
            },
        ];
        let result = format_table(&rows, "");

        assert!(result.contains("KIND"));
        assert!(result.contains("Refunds v1.0.0"));
        assert!(result.contains("Refunds - Dev"));
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }
}
