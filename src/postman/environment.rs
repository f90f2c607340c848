//! Postman environment types

use serde::{Deserialize, Serialize};

use super::{default_true, json_hash, lenient_string};

/// A named set of variables for one deployment stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanEnvironment {
    pub name: String,

    #[serde(default)]
    pub values: Vec<EnvVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub key: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(rename = "type", default)]
    pub var_type: VariableType,
}

/// Variable visibility in the Postman UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Default,
    Secret,
    Any,
}

impl EnvVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>, var_type: VariableType) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
            var_type,
        }
    }

    /// Empty placeholder the operator is expected to fill in.
    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}

impl PostmanEnvironment {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.key == key)
            .map(|v| v.value.as_str())
    }

    /// Keep values the operator already filled in remotely.
    ///
    /// Only placeholder variables (empty in the generated environment) are
    /// touched; generated values such as `base_url` always win.
    pub fn preserve_placeholders(&mut self, remote: &PostmanEnvironment) {
        for var in self.values.iter_mut().filter(|v| v.is_placeholder()) {
            if let Some(existing) = remote.get(&var.key).filter(|v| !v.is_empty()) {
                var.value = existing.to_string();
            }
        }
    }

    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        json_hash(self)
    }
}
