//! Upstream Client - the single place that talks to the Monkeytype API.
//!
//! The classification rule lives here and is intentional: any status below
//! 500 is a completed response whose body and status are handed back as-is,
//! 4xx included. Only genuine transport failures and upstream 5xx become
//! [`UpstreamFailure`]s. No retries, no caching.

use std::time::Duration;

use reqwest::redirect::Policy;
use serde_json::Value;
use tracing::{debug, warn};

use super::binder::UpstreamCall;
use super::error::UpstreamFailure;
use super::registry::HttpMethod;
use crate::core::config::UpstreamConfig;

const USER_AGENT: &str = concat!("monkeytype-mcp-server/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 5;

/// A completed upstream response (status below 500).
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// HTTP client for the upstream API.
///
/// Cheap to clone; holds a connection pool internally.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Build a client with the configured timeout and a bounded redirect
    /// policy.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issue an upstream call with the given ApeKey.
    ///
    /// The key goes out as `Authorization: ApeKey <key>` on every call and
    /// is never logged.
    pub async fn send(
        &self,
        call: &UpstreamCall,
        api_key: &str,
    ) -> Result<RawResponse, UpstreamFailure> {
        let url = format!("{}{}", self.base_url, call.path);
        debug!(method = call.method.as_str(), path = %call.path, "calling upstream");

        let method = match call.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .http
            .request(method, &url)
            .header("Authorization", format!("ApeKey {api_key}"))
            .header("Content-Type", "application/json");

        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status().as_u16();

        // Upstream answers JSON, but error pages occasionally are not;
        // carry non-JSON bodies through as plain text.
        let text = response.text().await.map_err(classify_send_error)?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status >= 500 {
            warn!(status, path = %call.path, "upstream server error");
            return Err(UpstreamFailure::UpstreamError { status, body });
        }

        Ok(RawResponse { status, body })
    }
}

/// Map a reqwest failure onto the transport taxonomy.
fn classify_send_error(error: reqwest::Error) -> UpstreamFailure {
    if error.is_builder() {
        UpstreamFailure::RequestSetup {
            message: error.to_string(),
        }
    } else {
        // Connect, DNS, timeout, and mid-body failures all mean the caller
        // got no usable response.
        UpstreamFailure::NoResponse {
            message: error.to_string(),
        }
    }
}
