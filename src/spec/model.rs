//! Typed subset of the OpenAPI document consumed by the builders
//!
//! Only the parts of OpenAPI 3.x that feed collection and environment
//! generation are modelled. Unknown fields are ignored, and every map that
//! carries declaration order (paths, properties, media types) is an
//! [`IndexMap`] so the builders can reproduce that order exactly.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level document as it appears on disk, before validation.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSpec {
    #[serde(default, deserialize_with = "scalar_string")]
    pub openapi: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub swagger: Option<String>,

    pub info: Option<Info>,

    pub servers: Option<Vec<Server>>,

    pub paths: Option<IndexMap<String, PathItem>>,

    #[serde(default)]
    pub components: Components,
}

/// `info` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// A declared deployment target
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,

    /// Token endpoint base for this server (vendor extension)
    #[serde(default, rename = "x-auth-url")]
    pub auth_url: Option<String>,
}

/// Substitution variable inside a server URL template
#[derive(Debug, Clone, Deserialize)]
pub struct ServerVariable {
    #[serde(deserialize_with = "required_scalar_string")]
    pub default: String,

    #[serde(default, rename = "enum")]
    pub allowed: Vec<Value>,
}

/// HTTP methods that become requests, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Fixed per-path ordering of generated requests.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations declared under one path template
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,

    /// Parameters shared by every operation on this path
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
        }
    }

    /// Declared operations in GET, POST, PUT, PATCH, DELETE order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default, rename = "operationId")]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,

    #[serde(default, rename = "requestBody")]
    pub request_body: Option<ReferenceOr<RequestBody>>,
}

/// Either an inline value or a `$ref` pointer into `components`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<ReferenceOr<Schema>>,

    #[serde(default)]
    pub example: Option<Value>,

    #[serde(default)]
    pub examples: IndexMap<String, Example>,
}

/// Named example; `$ref` examples deserialize with no value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    /// `type`, either a single name or (3.1) a list of names
    #[serde(default, rename = "type")]
    pub schema_type: Option<Value>,

    #[serde(default)]
    pub properties: IndexMap<String, ReferenceOr<Schema>>,

    #[serde(default)]
    pub items: Option<Box<ReferenceOr<Schema>>>,

    #[serde(default, rename = "allOf")]
    pub all_of: Vec<ReferenceOr<Schema>>,

    #[serde(default)]
    pub example: Option<Value>,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default, rename = "enum")]
    pub enumeration: Vec<Value>,
}

impl Schema {
    /// The first non-null type name.
    pub fn primary_type(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            Value::String(name) => Some(name.as_str()),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,

    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(default, rename = "requestBodies")]
    pub request_bodies: IndexMap<String, RequestBody>,

    #[serde(default, rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityScheme {
    #[serde(default, rename = "type")]
    pub scheme_type: Option<String>,

    #[serde(default)]
    pub flows: Option<OAuthFlows>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthFlows {
    #[serde(default, rename = "clientCredentials")]
    pub client_credentials: Option<OAuthFlow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthFlow {
    #[serde(default, rename = "tokenUrl")]
    pub token_url: Option<String>,
}

/// Accept any YAML/JSON scalar as a string (`version: 2` or `openapi: 3.1`).
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {}",
            other
        ))),
    }
}

fn required_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a scalar, found null"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_come_out_in_fixed_order() {
        let yaml = r#"
delete: { summary: remove }
get: { summary: read }
post: { summary: create }
"#;
        let item: PathItem = serde_yaml::from_str(yaml).unwrap();
        let methods: Vec<_> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete]
        );
    }

    #[test]
    fn test_reference_or_item() {
        let reference: ReferenceOr<Parameter> =
            serde_yaml::from_str("$ref: '#/components/parameters/Id'").unwrap();
        assert!(matches!(reference, ReferenceOr::Reference { .. }));

        let item: ReferenceOr<Parameter> =
            serde_yaml::from_str("{ name: id, in: path, required: true }").unwrap();
        let ReferenceOr::Item(param) = item else {
            panic!("Expected inline parameter");
        };
        assert_eq!(param.name, "id");
        assert_eq!(param.location, ParameterLocation::Path);
        assert!(param.required);
    }

    #[test]
    fn test_numeric_versions_become_strings() {
        let info: Info = serde_yaml::from_str("{ title: Refunds, version: 2 }").unwrap();
        assert_eq!(info.version.as_deref(), Some("2"));

        let info: Info = serde_yaml::from_str("{ title: Refunds, version: 1.5 }").unwrap();
        assert_eq!(info.version.as_deref(), Some("1.5"));
    }

    #[test]
    fn test_primary_type_skips_null() {
        let schema: Schema = serde_yaml::from_str("type: [null, integer]").unwrap();
        assert_eq!(schema.primary_type(), Some("integer"));

        let schema: Schema = serde_yaml::from_str("type: string").unwrap();
        assert_eq!(schema.primary_type(), Some("string"));
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let yaml = r#"
type: object
properties:
  zeta: { type: string }
  alpha: { type: integer }
  mid: { type: boolean }
"#;
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        let keys: Vec<_> = schema.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
