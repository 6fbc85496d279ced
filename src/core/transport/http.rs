//! HTTP transport implementation.
//!
//! A conventional REST reverse proxy: one route per registry entry, each
//! feeding the same pipeline as the MCP tools. GET routes forward query
//! parameters, non-GET routes forward the JSON body, and the response
//! status mirrors the upstream status. A root route lists the available
//! endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use serde_json::{Map, Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::config::CredentialSource;
use crate::core::McpServer;
use crate::domains::upstream::{
    ApiService, EndpointSpec, FailureKind, HttpMethod, InvokeError, NormalizedResult,
};
use std::sync::Arc;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    /// The shared dispatch pipeline.
    service: Arc<ApiService>,

    /// Where the ApeKey comes from for proxied calls.
    credential_source: CredentialSource,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let state = AppState {
            service: server.api_service().clone(),
            credential_source: server.config().credentials.source,
        };

        // Build router: one route per registry entry, plus listing + health
        let mut app = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check));

        for spec in state.service.registry().list_all() {
            app = app.route(spec.template, endpoint_router(spec));
        }

        let mut app = app.with_state(state).layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (REST proxy, one route per endpoint)", addr);
        info!("  → Listing: GET /");
        info!("  → Health:  GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the method router for one endpoint.
///
/// Route paths are the upstream templates without the configured prefix;
/// the `{param}` placeholder syntax is shared between the registry and
/// axum, so templates double as route patterns.
fn endpoint_router(spec: &EndpointSpec) -> MethodRouter<AppState> {
    let name = spec.name;
    match spec.method {
        HttpMethod::Get => get(
            move |State(state): State<AppState>,
                  Path(path_params): Path<HashMap<String, String>>,
                  Query(query): Query<HashMap<String, String>>,
                  headers: HeaderMap| async move {
                dispatch(state, name, path_params, query, headers, None).await
            },
        ),
        // The registry currently only defines GET and POST endpoints;
        // put/delete would register the same way.
        _ => post(
            move |State(state): State<AppState>,
                  Path(path_params): Path<HashMap<String, String>>,
                  Query(query): Query<HashMap<String, String>>,
                  headers: HeaderMap,
                  body: Option<Json<Value>>| async move {
                let body = body.map(|Json(value)| value);
                dispatch(state, name, path_params, query, headers, body).await
            },
        ),
    }
}

/// Root handler - static capability listing.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    let endpoints: Vec<Value> = state
        .service
        .registry()
        .list_all()
        .iter()
        .map(|spec| {
            json!({
                "name": spec.name,
                "method": spec.method.as_str(),
                "path": spec.template,
                "description": spec.description,
            })
        })
        .collect();

    Json(json!({
        "name": "monkeytype-mcp-server",
        "version": env!("CARGO_PKG_VERSION"),
        "transport": "HTTP proxy",
        "endpoints": endpoints,
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Run one proxied request through the shared pipeline.
async fn dispatch(
    state: AppState,
    name: &str,
    path_params: HashMap<String, String>,
    mut query: HashMap<String, String>,
    headers: HeaderMap,
    body: Option<Value>,
) -> Response {
    // Resolve the per-request credential before anything else; the
    // `apeKey` query parameter is stripped so it is never forwarded.
    let request_key = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("ApeKey "))
        .map(str::to_string)
        .or_else(|| query.remove("apeKey"));

    let key_override = match state.credential_source {
        CredentialSource::Env => None,
        CredentialSource::Request => match request_key {
            Some(key) => Some(key),
            None => {
                return error_response(
                    StatusCode::UNAUTHORIZED,
                    "missing_credential",
                    "supply an ApeKey via the Authorization header or the apeKey query parameter",
                );
            }
        },
    };

    // Assemble raw arguments: path params, then query, then body fields.
    let mut raw = Map::new();
    for (key, value) in path_params {
        raw.insert(key, Value::String(value));
    }
    for (key, value) in query {
        raw.insert(key, Value::String(value));
    }
    if let Some(Value::Object(fields)) = body {
        for (key, value) in fields {
            raw.insert(key, value);
        }
    }

    match state.service.invoke(name, &raw, key_override.as_deref()).await {
        Ok(result) => normalized_response(result),
        Err(error) => invoke_error_response(&error),
    }
}

/// Map a pipeline outcome onto an HTTP response.
///
/// Success mirrors the upstream status verbatim (4xx included); failures
/// use 504 for no-response, 500 for setup errors, and the upstream status
/// for 5xx passthrough.
fn normalized_response(result: NormalizedResult) -> Response {
    match result {
        NormalizedResult::Success { status, body } => {
            (status_code(status), Json(body)).into_response()
        }
        failure @ NormalizedResult::Failure { .. } => {
            let status = failure_status(&failure);
            (status, Json(failure.failure_json())).into_response()
        }
    }
}

fn failure_status(failure: &NormalizedResult) -> StatusCode {
    match failure {
        NormalizedResult::Failure {
            kind: FailureKind::NoResponse,
            ..
        } => StatusCode::GATEWAY_TIMEOUT,
        NormalizedResult::Failure {
            kind: FailureKind::RequestSetupError,
            ..
        } => StatusCode::INTERNAL_SERVER_ERROR,
        NormalizedResult::Failure {
            kind: FailureKind::UpstreamError,
            upstream_status,
            ..
        } => upstream_status
            .map(status_code)
            .unwrap_or(StatusCode::BAD_GATEWAY),
        NormalizedResult::Success { .. } => StatusCode::OK,
    }
}

/// Map a pre-network rejection onto an HTTP response.
fn invoke_error_response(error: &InvokeError) -> Response {
    match error {
        InvokeError::Validation(e) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", &e.to_string())
        }
        InvokeError::MissingCredential => error_response(
            StatusCode::UNAUTHORIZED,
            "missing_credential",
            &error.to_string(),
        ),
        InvokeError::UnknownEndpoint(_) => {
            error_response(StatusCode::NOT_FOUND, "unknown_operation", &error.to_string())
        }
    }
}

fn error_response(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "kind": kind, "message": message } })),
    )
        .into_response()
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::upstream::{Registry, RegistryOptions};

    #[test]
    fn test_every_template_registers_as_a_route() {
        // axum panics on path patterns it cannot parse and on conflicting
        // registrations, so building the full router proves the templates
        // are valid route patterns with distinct paths.
        let registry = Registry::new(RegistryOptions::default()).unwrap();
        let mut app: Router<AppState> = Router::new();
        for spec in registry.list_all() {
            app = app.route(spec.template, endpoint_router(spec));
        }
        let _ = app;
    }

    #[test]
    fn test_templates_use_plain_placeholder_segments() {
        // Placeholders must span a whole path segment; axum rejects
        // mid-segment braces like `/users/check-{name}`.
        let registry = Registry::new(RegistryOptions::default()).unwrap();
        for spec in registry.list_all() {
            for segment in spec.template.split('/') {
                let braced = segment.starts_with('{') && segment.ends_with('}');
                let plain = !segment.contains('{') && !segment.contains('}');
                assert!(
                    braced || plain,
                    "{}: segment '{}' mixes literal text and a placeholder",
                    spec.name,
                    segment
                );
            }
        }
    }

    #[test]
    fn test_failure_status_mapping() {
        let no_response = NormalizedResult::Failure {
            kind: FailureKind::NoResponse,
            message: "timed out".to_string(),
            upstream_status: None,
            upstream_body: None,
        };
        assert_eq!(failure_status(&no_response), StatusCode::GATEWAY_TIMEOUT);

        let setup = NormalizedResult::Failure {
            kind: FailureKind::RequestSetupError,
            message: "bad header".to_string(),
            upstream_status: None,
            upstream_body: None,
        };
        assert_eq!(failure_status(&setup), StatusCode::INTERNAL_SERVER_ERROR);

        let upstream = NormalizedResult::Failure {
            kind: FailureKind::UpstreamError,
            message: "upstream returned status 503".to_string(),
            upstream_status: Some(503),
            upstream_body: Some(json!({})),
        };
        assert_eq!(failure_status(&upstream), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_status_code_passthrough() {
        assert_eq!(status_code(404), StatusCode::NOT_FOUND);
        assert_eq!(status_code(200), StatusCode::OK);
        // Out-of-range statuses fall back rather than panic.
        assert_eq!(status_code(0), StatusCode::BAD_GATEWAY);
    }
}
