//! OpenAPI servers → Postman environments
//!
//! Each declared server becomes one environment named after its stage, and a
//! fixed `Local` environment pointing at the local mock server is appended.

use std::collections::HashSet;

use log::debug;
use reqwest::Url;

use crate::error::BuildError;
use crate::postman::{EnvVariable, PostmanEnvironment, VariableType};
use crate::spec::{Server, SpecDocument};

/// Stage name of the trailing local environment
pub const LOCAL_STAGE: &str = "Local";
pub const LOCAL_BASE_URL: &str = "http://localhost:3000/v2";
pub const LOCAL_AUTH_URL: &str = "http://localhost:3000";

const MAX_STAGE_LEN: usize = 40;
const TOKEN_PATH: &str = "/oauth/token";

/// Known stage keywords, checked in order against whole description words
const STAGE_KEYWORDS: [(&[&str], &str); 4] = [
    (&["dev", "development"], "Dev"),
    (&["qa"], "QA"),
    (&["uat"], "UAT"),
    (&["prod", "production"], "Prod"),
];

/// Build one environment per server, then `Local`.
///
/// # Errors
/// [`BuildError::NoServers`] when the document declares no servers.
pub fn build_environments(spec: &SpecDocument) -> Result<Vec<PostmanEnvironment>, BuildError> {
    if spec.servers.is_empty() {
        return Err(BuildError::NoServers);
    }

    let token_base = token_base_url(spec);
    let mut seen: HashSet<String> = HashSet::from([LOCAL_STAGE.to_string()]);

    let mut environments = Vec::with_capacity(spec.servers.len() + 1);
    for server in &spec.servers {
        let base_url = expand_server_url(server);
        let stage = unique_stage(&mut seen, stage_name(server, &base_url));
        let auth_url = server
            .auth_url
            .clone()
            .or_else(|| token_base.clone())
            .unwrap_or_else(|| origin(&base_url));

        debug!("Environment '{}' -> {}", stage, base_url);
        environments.push(environment(spec.title(), &stage, &base_url, &auth_url));
    }

    environments.push(environment(
        spec.title(),
        LOCAL_STAGE,
        LOCAL_BASE_URL,
        LOCAL_AUTH_URL,
    ));

    Ok(environments)
}

/// Environment with the standard variable set in fixed order.
pub fn environment(title: &str, stage: &str, base_url: &str, auth_url: &str) -> PostmanEnvironment {
    PostmanEnvironment {
        name: format!("{} - {}", title, stage),
        values: vec![
            EnvVariable::new("base_url", base_url, VariableType::Default),
            EnvVariable::new("auth_url", auth_url, VariableType::Default),
            EnvVariable::new("client_id", "", VariableType::Secret),
            EnvVariable::new("client_secret", "", VariableType::Secret),
            EnvVariable::new("jwt_token", "", VariableType::Secret),
            EnvVariable::new("jwt_expiry", "", VariableType::Default),
        ],
    }
}

/// Stage label for a server: a known stage keyword, else the cleaned
/// description, else the host.
pub fn stage_name(server: &Server, base_url: &str) -> String {
    let description = server.description.as_deref().unwrap_or_default();

    let words: Vec<String> = description
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    for (keywords, stage) in STAGE_KEYWORDS {
        if words.iter().any(|w| keywords.contains(&w.as_str())) {
            return stage.to_string();
        }
    }

    let cleaned = sanitize(description);
    if !cleaned.is_empty() {
        return cleaned;
    }

    Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| base_url.to_string())
}

fn sanitize(description: &str) -> String {
    let kept: String = description
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') || c.is_whitespace())
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .take(MAX_STAGE_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// `stage`, or `"<stage> <n>"` with the smallest `n >= 2` not yet taken.
fn unique_stage(seen: &mut HashSet<String>, stage: String) -> String {
    let mut name = stage.clone();
    let mut n = 2;
    while seen.contains(&name) {
        name = format!("{} {}", stage, n);
        n += 1;
    }
    seen.insert(name.clone());
    name
}

/// Server URL with `{variable}` templates replaced by their defaults.
pub fn expand_server_url(server: &Server) -> String {
    server
        .variables
        .iter()
        .fold(server.url.clone(), |url, (name, variable)| {
            url.replace(&format!("{{{}}}", name), &variable.default)
        })
}

/// Base of the first OAuth2 client-credentials token endpoint.
fn token_base_url(spec: &SpecDocument) -> Option<String> {
    let token_url = spec
        .components
        .security_schemes
        .values()
        .filter_map(|scheme| scheme.flows.as_ref()?.client_credentials.as_ref()?.token_url.as_deref())
        .next()?;

    let trimmed = token_url.trim_end_matches('/');
    match trimmed.strip_suffix(TOKEN_PATH) {
        Some(base) if !base.is_empty() => Some(base.to_string()),
        _ => Some(origin(trimmed)),
    }
}

/// `scheme://host[:port]` of `url`, or `url` itself if it is not absolute.
fn origin(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => parsed.origin().ascii_serialization(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SpecFormat, parse_spec};
    use std::path::Path;

    fn spec(content: &str) -> SpecDocument {
        parse_spec(content, SpecFormat::Yaml, Path::new("api.yaml")).unwrap()
    }

    fn server(url: &str, description: Option<&str>) -> Server {
        Server {
            url: url.to_string(),
            description: description.map(str::to_string),
            variables: Default::default(),
            auth_url: None,
        }
    }

    #[test]
    fn test_one_server_gives_stage_and_local() {
        let spec = spec(
            r#"
info: { title: Payment Refund API, version: 1.0.0 }
servers:
  - url: https://api-dev.example.com/v2
    description: Development
paths:
  /refunds:
    post: { summary: Create refund }
"#,
        );
        let envs = build_environments(&spec).unwrap();
        let names: Vec<_> = envs.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Payment Refund API - Dev", "Payment Refund API - Local"]
        );
        assert_eq!(envs[0].get("base_url"), Some("https://api-dev.example.com/v2"));
        assert_eq!(envs[0].get("auth_url"), Some("https://api-dev.example.com"));
        assert_eq!(envs[1].get("base_url"), Some(LOCAL_BASE_URL));
        assert_eq!(envs[1].get("auth_url"), Some(LOCAL_AUTH_URL));
    }

    #[test]
    fn test_variable_order_and_types() {
        let env = environment("API", "Dev", "https://a", "https://b");
        let keys: Vec<_> = env.values.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["base_url", "auth_url", "client_id", "client_secret", "jwt_token", "jwt_expiry"]
        );
        let types: Vec<_> = env.values.iter().map(|v| v.var_type).collect();
        assert_eq!(
            types,
            vec![
                VariableType::Default,
                VariableType::Default,
                VariableType::Secret,
                VariableType::Secret,
                VariableType::Secret,
                VariableType::Default,
            ]
        );
        assert!(env.values[4].value.is_empty());
    }

    #[test]
    fn test_stage_keywords() {
        let cases = [
            ("Development", "Dev"),
            ("dev server", "Dev"),
            ("QA environment", "QA"),
            ("User acceptance (UAT)", "UAT"),
            ("Production", "Prod"),
            ("Pre-prod mirror", "Prod"),
            ("Staging", "Staging"),
        ];
        for (description, expected) in cases {
            let s = server("https://api.example.com", Some(description));
            assert_eq!(stage_name(&s, &s.url), expected, "description: {}", description);
        }
    }

    #[test]
    fn test_stage_keyword_must_start_a_word() {
        let s = server("https://api.example.com", Some("Sandbox (undeveloped)"));
        assert_eq!(stage_name(&s, &s.url), "Sandbox undeveloped");
    }

    #[test]
    fn test_stage_keyword_must_be_whole_word() {
        let s = server("https://api.example.com", Some("Product sandbox"));
        assert_eq!(stage_name(&s, &s.url), "Product sandbox");

        let s = server("https://api.example.com", Some("Devices API"));
        assert_eq!(stage_name(&s, &s.url), "Devices API");
    }

    #[test]
    fn test_stage_falls_back_to_sanitized_description_then_host() {
        let s = server("https://api.example.com", Some("  Staging   EU #1!  "));
        assert_eq!(stage_name(&s, &s.url), "Staging EU 1");

        let long = "a".repeat(60);
        let s = server("https://api.example.com", Some(&long));
        assert_eq!(stage_name(&s, &s.url).len(), 40);

        let s = server("https://sandbox.example.com/v2", None);
        assert_eq!(stage_name(&s, &s.url), "sandbox.example.com");
    }

    #[test]
    fn test_duplicate_stages_are_suffixed() {
        let spec = spec(
            r#"
info: { title: API }
servers:
  - { url: https://dev1.example.com, description: Dev US }
  - { url: https://dev2.example.com, description: Dev EU }
  - { url: https://local.example.com, description: Local }
paths:
  /a:
    get: {}
"#,
        );
        let names: Vec<_> = build_environments(&spec)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(
            names,
            vec!["API - Dev", "API - Dev 2", "API - Local 2", "API - Local"]
        );
    }

    #[test]
    fn test_suffixed_stage_skips_names_already_taken() {
        let spec = spec(
            r#"
info: { title: API }
servers:
  - { url: https://a.example.com, description: Staging }
  - { url: https://b.example.com, description: Staging }
  - { url: https://c.example.com, description: Staging 2 }
paths:
  /a:
    get: {}
"#,
        );
        let envs = build_environments(&spec).unwrap();
        let names: Vec<_> = envs.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["API - Staging", "API - Staging 2", "API - Staging 2 2", "API - Local"]
        );
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), envs.len());
        assert_eq!(envs[2].get("base_url"), Some("https://c.example.com"));
    }

    #[test]
    fn test_server_variables_expand_to_defaults() {
        let spec = spec(
            r#"
info: { title: API }
servers:
  - url: https://{region}.api.example.com/{basePath}
    description: Production
    variables:
      region: { default: eu, enum: [eu, us] }
      basePath: { default: v2 }
paths:
  /a:
    get: {}
"#,
        );
        let envs = build_environments(&spec).unwrap();
        assert_eq!(envs[0].get("base_url"), Some("https://eu.api.example.com/v2"));
        assert_eq!(envs[0].get("auth_url"), Some("https://eu.api.example.com"));
    }

    #[test]
    fn test_auth_url_sources() {
        let spec = spec(
            r#"
info: { title: API }
servers:
  - url: https://api-qa.example.com/v2
    description: QA
    x-auth-url: https://auth-qa.example.com
  - url: https://api.example.com/v2
    description: Prod
paths:
  /a:
    get: {}
components:
  securitySchemes:
    oauth:
      type: oauth2
      flows:
        clientCredentials:
          tokenUrl: https://auth.example.com/oauth/token
"#,
        );
        let envs = build_environments(&spec).unwrap();
        assert_eq!(envs[0].get("auth_url"), Some("https://auth-qa.example.com"));
        assert_eq!(envs[1].get("auth_url"), Some("https://auth.example.com"));
    }

    #[test]
    fn test_no_servers_is_error() {
        let spec = spec("info: { title: A }\nservers: []\npaths:\n  /a:\n    get: {}\n");
        assert!(matches!(build_environments(&spec), Err(BuildError::NoServers)));
    }
}
