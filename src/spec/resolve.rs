//! Local `$ref` resolution against `components`
//!
//! Only same-document references of the form `#/components/<kind>/<name>`
//! are supported. Anything else resolves to `None` and is logged.

use log::warn;

use super::model::{Components, Parameter, ReferenceOr, RequestBody, Schema};

/// Resolves references for one document.
pub struct Resolver<'a> {
    components: &'a Components,
}

impl<'a> Resolver<'a> {
    pub fn new(components: &'a Components) -> Self {
        Self { components }
    }

    pub fn parameter<'b>(&self, param: &'b ReferenceOr<Parameter>) -> Option<&'b Parameter>
    where
        'a: 'b,
    {
        match param {
            ReferenceOr::Item(item) => Some(item),
            ReferenceOr::Reference { reference } => {
                let components = self.components;
                lookup(reference, "parameters", |name| components.parameters.get(name))
            }
        }
    }

    pub fn request_body<'b>(&self, body: &'b ReferenceOr<RequestBody>) -> Option<&'b RequestBody>
    where
        'a: 'b,
    {
        match body {
            ReferenceOr::Item(item) => Some(item),
            ReferenceOr::Reference { reference } => {
                let components = self.components;
                lookup(reference, "requestBodies", |name| {
                    components.request_bodies.get(name)
                })
            }
        }
    }

    pub fn schema<'b>(&self, schema: &'b ReferenceOr<Schema>) -> Option<&'b Schema>
    where
        'a: 'b,
    {
        match schema {
            ReferenceOr::Item(item) => Some(item),
            ReferenceOr::Reference { reference } => {
                let components = self.components;
                lookup(reference, "schemas", |name| components.schemas.get(name))
            }
        }
    }
}

/// Name of the component a reference points at, if it targets `kind`.
pub fn component_name<'r>(reference: &'r str, kind: &str) -> Option<&'r str> {
    reference
        .strip_prefix("#/components/")?
        .strip_prefix(kind)?
        .strip_prefix('/')
}

fn lookup<'r, T>(
    reference: &str,
    kind: &str,
    get: impl FnOnce(&str) -> Option<&'r T>,
) -> Option<&'r T> {
    let resolved = component_name(reference, kind).and_then(get);
    if resolved.is_none() {
        warn!("Unresolvable reference {} (expected #/components/{}/...)", reference, kind);
    }
    resolved
}
