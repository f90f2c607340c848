//! Postman artifact types
//!
//! These are the JSON shapes the Postman API accepts for collections (v2.1
//! schema) and environments. They serialize deterministically: field order is
//! fixed by the struct definitions and maps keep insertion order.
//!
//! The same types deserialize what the API returns, so a remote artifact can
//! be normalized and compared with a freshly built one. Fields we never
//! generate (ids, timestamps, responses) are dropped on the way in.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub mod collection;
pub mod environment;

pub use collection::{
    Auth, AuthAttribute, Body, CollectionInfo, Event, Header, Item, PostmanCollection, QueryParam,
    Request, Script, Url, UrlVariable,
};
pub use environment::{EnvVariable, PostmanEnvironment, VariableType};

/// SHA-256 hex digest of the compact JSON encoding of `value`.
pub fn json_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Deserialize any scalar (or null) into a `String`.
///
/// The API echoes values the way clients stored them, so a numeric
/// `jwt_expiry` or a null query value must still load.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Ok(other.to_string()),
    }
}

pub(crate) fn default_true() -> bool {
    true
}
