//! STDIO transport implementation.
//!
//! The standard MCP mode: JSON-RPC frames arrive on stdin and answers go
//! out on stdout, which is why every log line in this crate writes to
//! stderr. Credentials always come from the environment here; per-request
//! keys only exist on the HTTP proxy.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Serve the Monkeytype tools over stdin/stdout until the client
    /// disconnects.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!(
            tools = server.api_service().registry().list_all().len(),
            "Ready - serving Monkeytype tools over stdin/stdout"
        );

        let service = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        service
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        info!("STDIO client disconnected");
        Ok(())
    }
}
