//! Tool Router - builds the rmcp ToolRouter from the endpoint registry.
//!
//! One generic route per registry entry; there is no per-endpoint handler
//! code. Each route runs the shared pipeline and wraps the outcome as
//! text-carried JSON the way MCP clients expect.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter};
use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::{Value, json};
use tracing::warn;

use super::schema::input_schema;
use crate::domains::upstream::{ApiService, EndpointSpec, InvokeError, NormalizedResult};

/// Build the tool router with one route per registry entry.
pub fn build_tool_router<S>(service: Arc<ApiService>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let mut router = ToolRouter::new();
    let specs: Vec<EndpointSpec> = service.registry().list_all().to_vec();
    for spec in specs {
        router = router.with_route(endpoint_route(service.clone(), spec));
    }
    router
}

/// Tool metadata for one endpoint.
fn to_tool(spec: &EndpointSpec) -> Tool {
    Tool {
        name: spec.name.into(),
        description: Some(spec.description.into()),
        input_schema: Arc::new(input_schema(spec)),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Create the generic route for one endpoint.
fn endpoint_route<S>(service: Arc<ApiService>, spec: EndpointSpec) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let tool = to_tool(&spec);
    let name = spec.name;
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let service = service.clone();
        let args = ctx.arguments.clone().unwrap_or_default();
        async move {
            let rendered = match service.invoke(name, &args, None).await {
                Ok(result) => render_result(&result),
                Err(error) => render_invoke_error(name, &error),
            };
            Ok::<CallToolResult, McpError>(rendered)
        }
        .boxed()
    })
}

/// Wrap a pipeline outcome as an MCP tool result.
///
/// Completed upstream responses (4xx included) are successes carrying the
/// body verbatim; transport failures become error-flagged results with the
/// uniform JSON error shape.
fn render_result(result: &NormalizedResult) -> CallToolResult {
    match result {
        NormalizedResult::Success { body, .. } => {
            CallToolResult::success(vec![Content::text(pretty(body))])
        }
        failure => CallToolResult::error(vec![Content::text(pretty(&failure.failure_json()))]),
    }
}

/// Wrap a pre-network rejection as an error-flagged result.
fn render_invoke_error(name: &str, error: &InvokeError) -> CallToolResult {
    warn!(operation = name, %error, "tool call rejected");
    let payload = json!({
        "error": {
            "kind": match error {
                InvokeError::UnknownEndpoint(_) => "unknown_operation",
                InvokeError::Validation(_) => "validation_error",
                InvokeError::MissingCredential => "missing_credential",
            },
            "message": error.to_string(),
        }
    });
    CallToolResult::error(vec![Content::text(pretty(&payload))])
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::domains::upstream::FailureKind;
    use serde_json::json;

    struct TestServer {}

    fn test_service() -> Arc<ApiService> {
        let mut config = Config::default();
        config.credentials.api_key = Some("key".to_string());
        Arc::new(ApiService::new(&config).unwrap())
    }

    #[test]
    fn test_build_router_matches_registry() {
        let service = test_service();
        let router: ToolRouter<TestServer> = build_tool_router(service.clone());
        let tools = router.list_all();
        assert_eq!(tools.len(), service.registry().list_all().len());

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        for spec in service.registry().list_all() {
            assert!(names.contains(&spec.name), "missing tool {}", spec.name);
        }
    }

    #[test]
    fn test_tool_metadata() {
        let service = test_service();
        let router: ToolRouter<TestServer> = build_tool_router(service);
        let tools = router.list_all();
        let tool = tools.iter().find(|t| t.name == "check_username").unwrap();
        assert_eq!(
            tool.description.as_deref(),
            Some("Check if a username is available on Monkeytype")
        );
        let required = tool.input_schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("name")));
    }

    #[test]
    fn test_render_success_carries_body() {
        let result = NormalizedResult::Success {
            status: 200,
            body: json!({ "message": "ok" }),
        };
        let rendered = render_result(&result);
        assert!(!rendered.is_error.unwrap_or(false));
    }

    #[test]
    fn test_render_failure_is_error_flagged() {
        let result = NormalizedResult::Failure {
            kind: FailureKind::NoResponse,
            message: "connection refused".to_string(),
            upstream_status: None,
            upstream_body: None,
        };
        let rendered = render_result(&result);
        assert!(rendered.is_error.unwrap_or(false));
    }
}
