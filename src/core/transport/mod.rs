//! Transport layer for the server.
//!
//! This module provides the two front ends:
//! - **STDIO**: Standard input/output MCP transport - feature: `stdio`
//! - **HTTP**: REST reverse proxy, one route per upstream endpoint -
//!   feature: `http`
//!
//! Each transport handles the connection lifecycle and delegates dispatch
//! to the shared pipeline.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
