//! Example request body derivation

use serde_json::{Map, Value};

use crate::spec::{MediaType, Resolver, Schema};

/// Nesting limit when expanding object properties; guards self-referencing schemas.
const MAX_DEPTH: usize = 4;

/// Best example for a JSON media type, in order of preference:
/// media `example`, first of `examples`, schema `example`, then a value
/// assembled from the schema's properties.
pub fn media_example(media: &MediaType, resolver: &Resolver<'_>) -> Option<Value> {
    if let Some(example) = &media.example {
        return Some(example.clone());
    }

    if let Some(value) = media.examples.values().find_map(|e| e.value.clone()) {
        return Some(value);
    }

    let schema = resolver.schema(media.schema.as_ref()?)?;
    schema_example(schema, resolver, 0)
}

/// Example value for a schema, or `None` if nothing can be derived.
pub fn schema_example(schema: &Schema, resolver: &Resolver<'_>, depth: usize) -> Option<Value> {
    if let Some(example) = &schema.example {
        return Some(example.clone());
    }
    if let Some(default) = &schema.default {
        return Some(default.clone());
    }
    if let Some(first) = schema.enumeration.first() {
        return Some(first.clone());
    }

    let properties = object_properties(schema, resolver);
    if !properties.is_empty() {
        if depth >= MAX_DEPTH {
            return Some(Value::Object(Map::new()));
        }
        let mut object = Map::new();
        for (name, property) in properties {
            let value = schema_example(property, resolver, depth + 1)
                .unwrap_or_else(|| type_placeholder(property));
            object.insert(name.to_string(), value);
        }
        return Some(Value::Object(object));
    }

    match schema.primary_type() {
        Some("array") => {
            let item = schema
                .items
                .as_deref()
                .and_then(|items| resolver.schema(items))
                .filter(|_| depth < MAX_DEPTH)
                .and_then(|items| schema_example(items, resolver, depth + 1));
            Some(Value::Array(item.into_iter().collect()))
        }
        _ => None,
    }
}

/// Properties of `schema` including those pulled in through `allOf`.
fn object_properties<'s>(schema: &'s Schema, resolver: &Resolver<'s>) -> Vec<(&'s str, &'s Schema)> {
    let mut properties: Vec<(&str, &Schema)> = Vec::new();

    for part in &schema.all_of {
        if let Some(part) = resolver.schema(part) {
            for (name, property) in object_properties(part, resolver) {
                upsert_property(&mut properties, name, property);
            }
        }
    }
    for (name, property) in &schema.properties {
        if let Some(property) = resolver.schema(property) {
            upsert_property(&mut properties, name, property);
        }
    }

    properties
}

fn upsert_property<'s>(properties: &mut Vec<(&'s str, &'s Schema)>, name: &'s str, schema: &'s Schema) {
    match properties.iter_mut().find(|(existing, _)| *existing == name) {
        Some(slot) => slot.1 = schema,
        None => properties.push((name, schema)),
    }
}

/// Placeholder used when a property has no example, default or enum.
pub fn type_placeholder(schema: &Schema) -> Value {
    match schema.primary_type() {
        Some("integer") | Some("number") => Value::from(0),
        Some("boolean") => Value::Bool(true),
        Some("array") => Value::Array(Vec::new()),
        Some("object") => Value::Object(Map::new()),
        _ => Value::String("string".to_string()),
    }
}
