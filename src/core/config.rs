//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, configuration files, or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Upstream Monkeytype API configuration.
    pub upstream: UpstreamConfig,

    /// API credential configuration.
    pub credentials: CredentialsConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the upstream Monkeytype API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the Monkeytype API, without a trailing slash.
    pub base_url: String,

    /// Path prefix applied to every endpoint template (deployments differ
    /// between `/api/v1` and bare paths).
    pub path_prefix: String,

    /// Default secondary mode for `get_personal_bests` when the caller
    /// omits `mode2`.
    pub default_mode2: String,

    /// Total per-call timeout, in seconds.
    pub timeout_secs: u64,
}

/// Where the ApeKey credential comes from.
///
/// Exactly one discipline is active per deployment: either a single key is
/// read from the environment at startup, or the HTTP proxy extracts a key
/// from each incoming request. The stdio front end always uses `Env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// Process-wide key from `MONKEYTYPE_API_KEY`.
    Env,

    /// Per-request key from `Authorization: ApeKey <key>` or the `apeKey`
    /// query parameter (HTTP proxy only).
    Request,
}

/// Configuration for the upstream API credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Monkeytype ApeKey. Generate one in the Monkeytype account settings.
    pub api_key: Option<String>,

    /// Where the key is taken from at call time.
    pub source: CredentialSource,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("source", &self.source)
            .finish()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.monkeytype.com".to_string(),
            path_prefix: "/api/v1".to_string(),
            default_mode2: "60".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            source: CredentialSource::Env,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "monkeytype-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            upstream: UpstreamConfig::default(),
            credentials: CredentialsConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server-level variables are prefixed with `MCP_` (e.g. `MCP_LOG_LEVEL`),
    /// upstream variables with `MONKEYTYPE_` (e.g. `MONKEYTYPE_API_KEY`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(base_url) = std::env::var("MONKEYTYPE_BASE_URL") {
            config.upstream.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(prefix) = std::env::var("MONKEYTYPE_PATH_PREFIX") {
            config.upstream.path_prefix = prefix;
        }

        if let Ok(mode2) = std::env::var("MONKEYTYPE_DEFAULT_MODE2") {
            config.upstream.default_mode2 = mode2;
        }

        if let Ok(timeout) = std::env::var("MONKEYTYPE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.upstream.timeout_secs = secs;
            }
        }

        if let Ok(source) = std::env::var("MCP_CREDENTIAL_SOURCE") {
            config.credentials.source = match source.to_lowercase().as_str() {
                "request" => CredentialSource::Request,
                _ => CredentialSource::Env,
            };
        }

        if let Ok(api_key) = std::env::var("MONKEYTYPE_API_KEY") {
            config.credentials.api_key = Some(api_key);
            info!("Monkeytype ApeKey loaded from environment");
        } else if config.credentials.source == CredentialSource::Env {
            warn!(
                "MONKEYTYPE_API_KEY is not set; upstream calls will fail until \
                 it is configured (generate a key in the Monkeytype account settings)"
            );
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_credentials_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MONKEYTYPE_API_KEY", "test_key_12345");
        }
        let config = Config::from_env();
        assert_eq!(config.credentials.api_key.as_deref(), Some("test_key_12345"));
        unsafe {
            std::env::remove_var("MONKEYTYPE_API_KEY");
        }
    }

    #[test]
    fn test_credentials_absent_by_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("MONKEYTYPE_API_KEY");
        }
        let config = Config::from_env();
        assert!(config.credentials.api_key.is_none());
        assert_eq!(config.credentials.source, CredentialSource::Env);
    }

    #[test]
    fn test_credential_source_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_CREDENTIAL_SOURCE", "request");
        }
        let config = Config::from_env();
        assert_eq!(config.credentials.source, CredentialSource::Request);
        unsafe {
            std::env::remove_var("MCP_CREDENTIAL_SOURCE");
        }
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let creds = CredentialsConfig {
            api_key: Some("super_secret_key".to_string()),
            source: CredentialSource::Env,
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_upstream_defaults() {
        let config = Config::default();
        assert_eq!(config.upstream.base_url, "https://api.monkeytype.com");
        assert_eq!(config.upstream.path_prefix, "/api/v1");
        assert_eq!(config.upstream.default_mode2, "60");
        assert_eq!(config.upstream.timeout_secs, 30);
    }
}
