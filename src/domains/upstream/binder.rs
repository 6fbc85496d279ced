//! Parameter Binder - turns raw arguments into a concrete upstream call.
//!
//! Validation happens entirely here, before any network I/O: missing
//! required fields, wrong types, and out-of-set enum values are reported as
//! [`ValidationError`]s. Optional fields with no default are omitted from
//! the outgoing call, never sent as null or empty.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

use super::error::ValidationError;
use super::registry::{EndpointSpec, HttpMethod, ParamKind, ParameterSpec, Placement};

/// Characters left verbatim when encoding a path segment (RFC 3986
/// unreserved set).
const PATH_SEGMENT: &percent_encoding::AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A fully-formed call to the upstream API. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    pub method: HttpMethod,

    /// Prefixed path with every placeholder substituted and encoded.
    pub path: String,

    /// Query parameters, in parameter declaration order.
    pub query: Vec<(String, String)>,

    /// JSON body for non-GET calls; `None` when nothing was bound to it.
    pub body: Option<Map<String, Value>>,
}

/// A resolved parameter value, normalized to the shapes the wire needs.
enum Bound {
    Text(String),
    Number(serde_json::Number),
}

impl Bound {
    fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Text(s) => Value::String(s),
            Self::Number(n) => Value::Number(n),
        }
    }
}

/// Bind raw arguments against an endpoint spec.
///
/// Fields are processed in declaration order; the first violation wins.
/// Explicit JSON nulls count as absent, matching what both front ends may
/// hand us for omitted optionals.
pub fn bind(
    path_prefix: &str,
    spec: &EndpointSpec,
    raw: &Map<String, Value>,
) -> Result<UpstreamCall, ValidationError> {
    let mut path = format!("{}{}", path_prefix, spec.template);
    let mut query = Vec::new();
    let mut body = Map::new();

    for param in &spec.params {
        let Some(bound) = resolve(param, raw.get(param.name))? else {
            continue;
        };

        match param.placement {
            Placement::Path => {
                let encoded = utf8_percent_encode(&bound.render(), PATH_SEGMENT).to_string();
                path = path.replace(&format!("{{{}}}", param.name), &encoded);
            }
            Placement::Query if !spec.method.has_body() => {
                query.push((param.name.to_string(), bound.render()));
            }
            // Query parameters ride in the JSON body on non-GET methods,
            // as does everything body-placed.
            Placement::Query | Placement::Body => {
                body.insert(param.name.to_string(), bound.into_value());
            }
        }
    }

    Ok(UpstreamCall {
        method: spec.method,
        path,
        query,
        body: if body.is_empty() { None } else { Some(body) },
    })
}

/// Resolve one parameter: supplied value, else default, else absent.
fn resolve(
    param: &ParameterSpec,
    supplied: Option<&Value>,
) -> Result<Option<Bound>, ValidationError> {
    let supplied = supplied.filter(|v| !v.is_null());

    let Some(value) = supplied else {
        if let Some(default) = &param.default {
            return Ok(Some(Bound::Text(default.clone())));
        }
        if param.required {
            return Err(ValidationError::MissingRequired {
                field: param.name.to_string(),
            });
        }
        return Ok(None);
    };

    match param.kind {
        ParamKind::String => match value {
            Value::String(s) => Ok(Some(Bound::Text(s.clone()))),
            _ => Err(ValidationError::InvalidType {
                field: param.name.to_string(),
                expected: "string",
            }),
        },
        ParamKind::Number => match value {
            Value::Number(n) => Ok(Some(Bound::Number(n.clone()))),
            // Proxy query parameters always arrive as strings; accept the
            // numeric ones and keep their original lexical form.
            Value::String(s) if s.parse::<f64>().is_ok() => Ok(Some(Bound::Text(s.clone()))),
            _ => Err(ValidationError::InvalidType {
                field: param.name.to_string(),
                expected: "number",
            }),
        },
        ParamKind::Enum(allowed) => match value {
            Value::String(s) if allowed.contains(&s.as_str()) => Ok(Some(Bound::Text(s.clone()))),
            _ => Err(ValidationError::InvalidEnum {
                field: param.name.to_string(),
                allowed,
            }),
        },
    }
}
