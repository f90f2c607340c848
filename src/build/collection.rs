//! OpenAPI → Postman collection

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use super::example::media_example;
use crate::error::BuildError;
use crate::postman::{
    Auth, Body, CollectionInfo, Header, Item, PostmanCollection, QueryParam, Request, Url,
    UrlVariable, collection::COLLECTION_SCHEMA_URL,
};
use crate::script;
use crate::spec::{
    HttpMethod, MediaType, Operation, Parameter, ParameterLocation, PathItem, Resolver,
    SpecDocument,
};

/// Folder for operations without tags
pub const DEFAULT_FOLDER: &str = "General";

/// Variable every request URL is rooted at
pub const BASE_URL_VARIABLE: &str = "{{base_url}}";

/// Variable holding the bearer token maintained by the pre-request script
pub const TOKEN_VARIABLE: &str = "jwt_token";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Build the collection for `spec`.
///
/// Output depends only on the document, so an unchanged spec always
/// serializes to identical bytes.
///
/// # Errors
/// [`BuildError::InvalidPath`] if any path key is empty or relative.
pub fn build_collection(spec: &SpecDocument) -> Result<PostmanCollection, BuildError> {
    if let Some(bad) = spec.paths.keys().find(|p| !p.starts_with('/')) {
        return Err(BuildError::InvalidPath(bad.clone()));
    }

    let resolver = spec.resolver();
    let mut folders: IndexMap<&str, Vec<Item>> = IndexMap::new();

    for (path, method, path_item, operation) in spec.operations() {
        let tag = operation
            .tags
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_FOLDER);
        let item = request_item(path, method, path_item, operation, &resolver);
        folders.entry(tag).or_default().push(item);
    }

    debug!(
        "Built {} request(s) in {} folder(s) for {}",
        folders.values().map(Vec::len).sum::<usize>(),
        folders.len(),
        spec.collection_name()
    );

    Ok(PostmanCollection {
        info: CollectionInfo {
            name: spec.collection_name(),
            description: spec.info.description.clone(),
            schema: COLLECTION_SCHEMA_URL.to_string(),
        },
        item: folders
            .into_iter()
            .map(|(tag, items)| Item::folder(tag, None, items))
            .collect(),
        event: vec![script::prerequest_event()],
        auth: Some(Auth::bearer_variable(TOKEN_VARIABLE)),
    })
}

/// Display name for an operation: summary, operationId, then `METHOD path`.
pub fn request_name(path: &str, method: HttpMethod, operation: &Operation) -> String {
    operation
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(operation.operation_id.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", method, path))
}

fn request_item(
    path: &str,
    method: HttpMethod,
    path_item: &PathItem,
    operation: &Operation,
    resolver: &Resolver<'_>,
) -> Item {
    let params = merged_parameters(path_item, operation, resolver);

    let mut url = Url {
        raw: format!("{}{}", BASE_URL_VARIABLE, path),
        host: vec![BASE_URL_VARIABLE.to_string()],
        path: path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect(),
        query: Vec::new(),
        variable: Vec::new(),
    };
    let mut header = Vec::new();

    for param in params {
        match param.location {
            ParameterLocation::Path => url.variable.push(UrlVariable {
                key: param.name.clone(),
                value: format!("{{{{{}}}}}", param.name),
                description: param.description.clone(),
            }),
            ParameterLocation::Query => url.query.push(QueryParam {
                key: param.name.clone(),
                value: String::new(),
                description: param.description.clone(),
                disabled: !param.required,
            }),
            ParameterLocation::Header => header.push(Header {
                key: param.name.clone(),
                value: param.example.as_ref().map(scalar_text).unwrap_or_default(),
                description: param.description.clone(),
            }),
            ParameterLocation::Cookie => {}
        }
    }

    let body = operation
        .request_body
        .as_ref()
        .and_then(|body| resolver.request_body(body))
        .and_then(|body| json_media(&body.content))
        .map(|media| {
            let example = media_example(media, resolver)
                .unwrap_or_else(|| Value::Object(Default::default()));
            Body::json(format!("{:#}", example))
        });

    if body.is_some() {
        header.push(Header {
            key: "Content-Type".to_string(),
            value: JSON_MEDIA_TYPE.to_string(),
            description: None,
        });
    }

    Item::request(
        request_name(path, method, operation),
        Request {
            method: method.as_str().to_string(),
            header,
            url,
            body,
            description: operation.description.clone(),
            auth: None,
        },
    )
}

/// Path-item parameters followed by operation parameters; an operation
/// parameter replaces a path-item one with the same name and location.
fn merged_parameters<'s>(
    path_item: &'s PathItem,
    operation: &'s Operation,
    resolver: &Resolver<'s>,
) -> Vec<&'s Parameter> {
    let mut merged: Vec<&Parameter> = Vec::new();

    for param in path_item
        .parameters
        .iter()
        .chain(operation.parameters.iter())
        .filter_map(|p| resolver.parameter(p))
    {
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(slot) => *slot = param,
            None => merged.push(param),
        }
    }

    merged
}

fn json_media(content: &IndexMap<String, MediaType>) -> Option<&MediaType> {
    content.get(JSON_MEDIA_TYPE).or_else(|| {
        content
            .iter()
            .find(|(media_type, _)| media_type.ends_with("+json"))
            .map(|(_, media)| media)
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
