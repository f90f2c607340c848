//! Postman Collection v2.1 types

use serde::{Deserialize, Serialize};

use super::{json_hash, lenient_string};

/// Schema URL stamped into every generated collection
pub const COLLECTION_SCHEMA_URL: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Root of a Postman collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: CollectionInfo,

    #[serde(default)]
    pub item: Vec<Item>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<Event>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub schema: String,
}

/// A folder (has `item`) or a request (has `request`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
}

impl Item {
    pub fn folder(name: impl Into<String>, description: Option<String>, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            description,
            item: Some(items),
            request: None,
        }
    }

    pub fn request(name: impl Into<String>, request: Request) -> Self {
        Self {
            name: name.into(),
            description: None,
            item: None,
            request: Some(request),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.item.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<Header>,

    pub url: Url,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `None` inherits the collection auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    #[serde(default)]
    pub raw: String,

    #[serde(default)]
    pub host: Vec<String>,

    #[serde(default)]
    pub path: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<UrlVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlVariable {
    pub key: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Raw request body; only `mode: raw` is generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,

    #[serde(default)]
    pub raw: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BodyOptions>,
}

impl Body {
    /// A raw JSON body.
    pub fn json(raw: String) -> Self {
        Self {
            mode: "raw".to_string(),
            raw,
            options: Some(BodyOptions {
                raw: RawOptions {
                    language: "json".to_string(),
                },
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyOptions {
    pub raw: RawOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOptions {
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(rename = "type")]
    pub auth_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bearer: Vec<AuthAttribute>,
}

impl Auth {
    /// Bearer auth whose token comes from a variable, e.g. `{{jwt_token}}`.
    pub fn bearer_variable(variable: &str) -> Self {
        Self {
            auth_type: "bearer".to_string(),
            bearer: vec![AuthAttribute {
                key: "token".to_string(),
                value: format!("{{{{{}}}}}", variable),
                attr_type: "string".to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthAttribute {
    pub key: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,

    #[serde(rename = "type", default)]
    pub attr_type: String,
}

/// Script hook (`prerequest` or `test`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub listen: String,
    pub script: Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(rename = "type", default)]
    pub script_type: String,

    #[serde(default)]
    pub exec: Vec<String>,
}

impl PostmanCollection {
    /// All request items, depth-first in collection order.
    pub fn requests(&self) -> Vec<&Item> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a Item>) {
            for item in items {
                if let Some(children) = &item.item {
                    walk(children, out);
                } else if item.request.is_some() {
                    out.push(item);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.item, &mut out);
        out
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    pub fn folder_count(&self) -> usize {
        self.item.iter().filter(|i| i.is_folder()).count()
    }

    /// Hash of the generated content, stable across runs.
    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        json_hash(self)
    }
}
