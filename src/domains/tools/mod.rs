//! Tools domain - the MCP-facing view of the endpoint registry.
//!
//! - `schema.rs` - input schemas generated from parameter specs
//! - `router.rs` - dynamic ToolRouter, one generic route per endpoint
//!
//! Adding an endpoint means adding a registry entry; nothing here changes.

pub mod router;
pub mod schema;

pub use router::build_tool_router;
pub use schema::input_schema;
