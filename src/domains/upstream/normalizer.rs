//! Response Normalizer - one uniform result shape for both front ends.
//!
//! A pure mapping: completed responses pass through with their status and
//! body verbatim, transport failures collapse into a small failure taxonomy.
//! No retries, no side effects.

use serde_json::{Value, json};

use super::client::RawResponse;
use super::error::UpstreamFailure;

/// How an upstream interaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response at all (DNS, connection, timeout).
    NoResponse,

    /// The upstream answered with a 5xx status.
    UpstreamError,

    /// The request could not be constructed.
    RequestSetupError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoResponse => "no_response",
            Self::UpstreamError => "upstream_error",
            Self::RequestSetupError => "request_setup_error",
        }
    }
}

/// The outcome handed to a front-end adapter. Never mutated after
/// construction.
#[derive(Debug, Clone)]
pub enum NormalizedResult {
    /// A completed upstream response, 4xx included.
    Success { status: u16, body: Value },

    /// A transport-level failure.
    Failure {
        kind: FailureKind,
        message: String,
        upstream_status: Option<u16>,
        upstream_body: Option<Value>,
    },
}

/// Map a client outcome onto the uniform result shape.
pub fn normalize(outcome: Result<RawResponse, UpstreamFailure>) -> NormalizedResult {
    match outcome {
        Ok(RawResponse { status, body }) => NormalizedResult::Success { status, body },
        Err(UpstreamFailure::UpstreamError { status, body }) => NormalizedResult::Failure {
            kind: FailureKind::UpstreamError,
            message: format!("upstream returned status {status}"),
            upstream_status: Some(status),
            upstream_body: Some(body),
        },
        Err(UpstreamFailure::NoResponse { message }) => NormalizedResult::Failure {
            kind: FailureKind::NoResponse,
            message,
            upstream_status: None,
            upstream_body: None,
        },
        Err(UpstreamFailure::RequestSetup { message }) => NormalizedResult::Failure {
            kind: FailureKind::RequestSetupError,
            message,
            upstream_status: None,
            upstream_body: None,
        },
    }
}

impl NormalizedResult {
    /// Render a failure as the uniform JSON error shape. Success bodies are
    /// passed through untouched by the front ends and never go through here.
    pub fn failure_json(&self) -> Value {
        match self {
            Self::Success { status, body } => json!({ "status": status, "body": body }),
            Self::Failure {
                kind,
                message,
                upstream_status,
                upstream_body,
            } => {
                let mut error = json!({
                    "kind": kind.as_str(),
                    "message": message,
                });
                if let Some(status) = upstream_status {
                    error["upstreamStatus"] = json!(status);
                }
                if let Some(body) = upstream_body {
                    error["upstreamBody"] = body.clone();
                }
                json!({ "error": error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_404_with_json_body_is_success() {
        let body = json!({ "message": "User not found" });
        let result = normalize(Ok(RawResponse {
            status: 404,
            body: body.clone(),
        }));
        match result {
            NormalizedResult::Success { status, body: b } => {
                assert_eq!(status, 404);
                assert_eq!(b, body);
            }
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[test]
    fn test_200_passes_through() {
        let result = normalize(Ok(RawResponse {
            status: 200,
            body: json!({ "data": [1, 2, 3] }),
        }));
        assert!(matches!(result, NormalizedResult::Success { status: 200, .. }));
    }

    #[test]
    fn test_no_response_maps_to_failure() {
        let result = normalize(Err(UpstreamFailure::NoResponse {
            message: "connection refused".to_string(),
        }));
        match result {
            NormalizedResult::Failure {
                kind,
                upstream_status,
                upstream_body,
                ..
            } => {
                assert_eq!(kind, FailureKind::NoResponse);
                assert!(upstream_status.is_none());
                assert!(upstream_body.is_none());
            }
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    #[test]
    fn test_upstream_error_keeps_status_and_body() {
        let result = normalize(Err(UpstreamFailure::UpstreamError {
            status: 502,
            body: json!({ "message": "bad gateway" }),
        }));
        match result {
            NormalizedResult::Failure {
                kind,
                upstream_status,
                upstream_body,
                ..
            } => {
                assert_eq!(kind, FailureKind::UpstreamError);
                assert_eq!(upstream_status, Some(502));
                assert_eq!(upstream_body, Some(json!({ "message": "bad gateway" })));
            }
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    #[test]
    fn test_request_setup_maps_to_failure() {
        let result = normalize(Err(UpstreamFailure::RequestSetup {
            message: "invalid header".to_string(),
        }));
        assert!(matches!(
            result,
            NormalizedResult::Failure {
                kind: FailureKind::RequestSetupError,
                ..
            }
        ));
    }

    #[test]
    fn test_failure_json_shape() {
        let result = normalize(Err(UpstreamFailure::UpstreamError {
            status: 500,
            body: json!({ "message": "boom" }),
        }));
        let rendered = result.failure_json();
        assert_eq!(rendered["error"]["kind"], "upstream_error");
        assert_eq!(rendered["error"]["upstreamStatus"], 500);
        assert_eq!(rendered["error"]["upstreamBody"]["message"], "boom");
    }
}
