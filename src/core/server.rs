//! MCP Server implementation and lifecycle management.
//!
//! The handler implements the MCP protocol by delegating to the shared
//! dispatch pipeline. Tool routes are built dynamically from the endpoint
//! registry in `domains/tools/router.rs`; adding an endpoint never touches
//! this file.

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use crate::domains::tools::build_tool_router;
use crate::domains::upstream::ApiService;

/// The main MCP server handler.
///
/// Holds the immutable configuration, the shared pipeline, and the tool
/// router derived from the registry.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The shared dispatch pipeline (registry + client + normalizer).
    api_service: Arc<ApiService>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Fails fast when the endpoint registry or the HTTP client cannot be
    /// constructed.
    pub fn new(config: Config) -> crate::core::Result<Self> {
        let config = Arc::new(config);
        let api_service = Arc::new(ApiService::new(&config)?);

        Ok(Self {
            tool_router: build_tool_router::<Self>(api_service.clone()),
            config,
            api_service,
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the shared pipeline (used by the HTTP proxy front end).
    pub fn api_service(&self) -> &Arc<ApiService> {
        &self.api_service
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Exposes the Monkeytype typing-test API as tools: user stats, \
                 test results, leaderboards, and public data. Most tools require \
                 a Monkeytype ApeKey."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
