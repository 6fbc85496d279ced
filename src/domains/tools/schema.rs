//! JSON schema generation for tool listings.
//!
//! Input schemas are derived from the registry's parameter specs instead of
//! per-endpoint structs, so the tool listing always matches what the binder
//! actually enforces.

use serde_json::{Map, Value, json};

use crate::domains::upstream::{EndpointSpec, ParamKind};

/// Build the JSON-schema object describing an endpoint's arguments.
pub fn input_schema(spec: &EndpointSpec) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &spec.params {
        let mut property = match param.kind {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Number => json!({ "type": "number" }),
            ParamKind::Enum(allowed) => json!({ "type": "string", "enum": allowed }),
        };
        property["description"] = json!(param.description);
        if let Some(default) = &param.default {
            property["default"] = json!(default);
        }
        properties.insert(param.name.to_string(), property);

        if param.required && param.default.is_none() {
            required.push(param.name);
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    schema
}
