//! Upstream domain - the core dispatch pipeline.
//!
//! A declarative endpoint registry consumed by one generic pipeline:
//!
//! - `registry.rs` - the Monkeytype endpoint table, validated at startup
//! - `binder.rs` - raw arguments -> concrete upstream call, or a
//!   validation error before any network I/O
//! - `client.rs` - the HTTP call itself (ApeKey auth, bounded timeout)
//! - `normalizer.rs` - uniform success/failure result shape
//! - `service.rs` - glue: lookup -> bind -> send -> normalize
//!
//! Front ends (MCP tools, HTTP proxy) are thin shims over
//! [`ApiService::invoke`].

pub mod binder;
pub mod client;
mod error;
pub mod normalizer;
pub mod registry;
mod service;

pub use binder::UpstreamCall;
pub use client::{RawResponse, UpstreamClient};
pub use error::{RegistryError, UpstreamFailure, ValidationError};
pub use normalizer::{FailureKind, NormalizedResult, normalize};
pub use registry::{EndpointSpec, HttpMethod, ParamKind, ParameterSpec, Placement, Registry, RegistryOptions};
pub use service::{ApiService, InvokeError};
