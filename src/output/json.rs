//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Envelope for `--format json` output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// When the output was produced (RFC 3339)
    pub timestamp: String,

    /// postsync version
    pub version: String,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Pretty-printed JSON wrapped in the `{data, meta}` envelope.
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Issue {
        severity: &'static str,
        message: &'static str,
    }

    #[test]
    fn test_envelope_carries_version_and_timestamp() {
        let output = JsonOutput::new(3);
        assert_eq!(output.data, 3);
        assert_eq!(output.meta.version, env!("CARGO_PKG_VERSION"));
        assert!(chrono::DateTime::parse_from_rfc3339(&output.meta.timestamp).is_ok());
    }

    #[test]
    fn test_format_json_wraps_data() {
        let issues = vec![Issue {
            severity: "warning",
            message: "GET /refunds missing operationId",
        }];
        let result = format_json(&issues).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();

        assert_eq!(parsed["data"][0]["severity"], "warning");
        assert!(parsed["meta"]["timestamp"].is_string());
    }

    #[test]
    fn test_format_json_empty_list() {
        let issues: Vec<Issue> = vec![];
        assert!(format_json(&issues).unwrap().contains("\"data\": []"));
    }
}
