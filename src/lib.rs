//! Monkeytype MCP Server
//!
//! A thin adapter that exposes the Monkeytype REST API as callable tools
//! through two front ends sharing a single dispatch pipeline.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the MCP server handler, and
//!   the transport layer (stdio, and an HTTP reverse proxy behind the
//!   `http` feature)
//! - **domains**: Business logic organized by bounded contexts
//!   - **upstream**: The endpoint registry, parameter binder, upstream
//!     client, and response normalizer
//!   - **tools**: Tool listing and dispatch built from the registry
//!
//! # Example
//!
//! ```rust,no_run
//! use monkeytype_mcp_server::core::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
