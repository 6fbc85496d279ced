//! Error taxonomy for the upstream pipeline.
//!
//! Validation errors are caught before any network call; transport errors
//! come back from the wire. Neither is ever retried.

use serde_json::Value;
use thiserror::Error;

/// A malformed registry definition, detected at construction time.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two endpoint entries share a name.
    #[error("duplicate endpoint name '{0}'")]
    DuplicateName(String),

    /// A path-placement parameter has no `{placeholder}` in the template.
    #[error("endpoint '{endpoint}': path parameter '{param}' has no placeholder in '{template}'")]
    MissingPlaceholder {
        endpoint: String,
        param: String,
        template: String,
    },

    /// A template placeholder has no matching path-placement parameter.
    #[error("endpoint '{endpoint}': placeholder '{{{placeholder}}}' has no path parameter")]
    UnboundPlaceholder {
        endpoint: String,
        placeholder: String,
    },

    /// A body-placement parameter on a GET endpoint can never be sent.
    #[error("endpoint '{endpoint}': body parameter '{param}' on a GET endpoint")]
    BodyParamOnGet { endpoint: String, param: String },
}

/// A request that failed validation before reaching the network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required parameter with no default was not supplied.
    #[error("missing required parameter '{field}'")]
    MissingRequired { field: String },

    /// A supplied value is outside the enumerated set.
    #[error("invalid value for '{field}': expected one of {allowed:?}")]
    InvalidEnum {
        field: String,
        allowed: &'static [&'static str],
    },

    /// A supplied value has the wrong type (e.g. a non-numeric string for a
    /// numeric parameter).
    #[error("invalid value for '{field}': expected a {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },
}

impl ValidationError {
    /// The offending field name.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingRequired { field }
            | Self::InvalidEnum { field, .. }
            | Self::InvalidType { field, .. } => field,
        }
    }
}

/// A failure surfaced by the upstream client.
///
/// Anything below HTTP 500 is a completed response and never reaches this
/// type; only genuine transport failures and upstream 5xx do.
#[derive(Debug, Error)]
pub enum UpstreamFailure {
    /// No response at all: DNS, connection, or timeout failure.
    #[error("no response from upstream: {message}")]
    NoResponse { message: String },

    /// The upstream answered with a 5xx status.
    #[error("upstream error {status}")]
    UpstreamError { status: u16, body: Value },

    /// The request could not be constructed. The binder should have caught
    /// this earlier.
    #[error("request setup failed: {message}")]
    RequestSetup { message: String },
}
