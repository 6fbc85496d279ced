//! The shared dispatch pipeline: registry lookup, bind, send, normalize.
//!
//! Both front ends call [`ApiService::invoke`] and only differ in how they
//! assemble raw arguments and render the outcome.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use super::binder::bind;
use super::client::UpstreamClient;
use super::error::ValidationError;
use super::normalizer::{NormalizedResult, normalize};
use super::registry::{Registry, RegistryOptions};
use crate::core::config::Config;

/// An invocation rejected before any network call was made.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The operation name is not in the registry.
    #[error("unknown operation '{0}'")]
    UnknownEndpoint(String),

    /// The arguments failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No ApeKey available for the configured credential source.
    #[error("no ApeKey configured; set MONKEYTYPE_API_KEY or supply one per request")]
    MissingCredential,
}

/// The dispatch pipeline shared by both front ends.
///
/// Holds only immutable state (registry, client, startup credential);
/// invocations are independent and impose no locking of their own.
#[derive(Debug, Clone)]
pub struct ApiService {
    registry: Arc<Registry>,
    client: UpstreamClient,
    api_key: Option<String>,
}

impl ApiService {
    /// Build the pipeline from configuration.
    ///
    /// Registry construction validates the endpoint table and fails fast
    /// on a malformed definition.
    pub fn new(config: &Config) -> crate::core::Result<Self> {
        let registry = Registry::new(RegistryOptions {
            path_prefix: config.upstream.path_prefix.clone(),
            default_mode2: config.upstream.default_mode2.clone(),
        })?;

        let client = UpstreamClient::new(&config.upstream)?;

        Ok(Self {
            registry: Arc::new(registry),
            client,
            api_key: config.credentials.api_key.clone(),
        })
    }

    /// The endpoint table.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one invocation through the pipeline.
    ///
    /// `key_override` carries a per-request credential (HTTP proxy in
    /// request mode); otherwise the startup key is used. Validation and
    /// credential problems return as [`InvokeError`] before any network
    /// call; everything that reached the wire comes back as a
    /// [`NormalizedResult`].
    #[instrument(skip(self, raw, key_override), fields(operation = name))]
    pub async fn invoke(
        &self,
        name: &str,
        raw: &Map<String, Value>,
        key_override: Option<&str>,
    ) -> Result<NormalizedResult, InvokeError> {
        let spec = self
            .registry
            .lookup(name)
            .ok_or_else(|| InvokeError::UnknownEndpoint(name.to_string()))?;

        let call = bind(self.registry.path_prefix(), spec, raw)?;

        let api_key = match key_override {
            Some(key) => key,
            None => self.api_key.as_deref().ok_or(InvokeError::MissingCredential)?,
        };

        debug!(path = %call.path, "bound upstream call");
        Ok(normalize(self.client.send(&call, api_key).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use serde_json::json;

    fn service_with_key(base_url: Option<String>, api_key: Option<&str>) -> ApiService {
        let mut config = Config::default();
        if let Some(url) = base_url {
            config.upstream.base_url = url;
        }
        config.credentials.api_key = api_key.map(str::to_string);
        ApiService::new(&config).unwrap()
    }

    fn args(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let service = service_with_key(None, Some("key"));
        let err = service.invoke("get_wpm", &Map::new(), None).await.unwrap_err();
        assert!(matches!(err, InvokeError::UnknownEndpoint(_)));
    }

    #[tokio::test]
    async fn test_validation_error_before_any_network_call() {
        // An unroutable base URL proves validation short-circuits: a
        // network attempt would surface as a NormalizedResult instead.
        let service = service_with_key(Some("http://127.0.0.1:1".to_string()), Some("key"));
        let err = service
            .invoke("check_username", &Map::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InvokeError::Validation(ValidationError::MissingRequired { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_credential_is_distinct() {
        let service = service_with_key(Some("http://127.0.0.1:1".to_string()), None);
        let err = service
            .invoke("get_tags", &Map::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::MissingCredential));
    }

    #[tokio::test]
    async fn test_key_override_takes_precedence_over_missing_key() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/tags"))
            .and(header("Authorization", "ApeKey per-request-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&mock_server)
            .await;

        let service = service_with_key(Some(mock_server.uri()), None);
        let result = service
            .invoke("get_tags", &Map::new(), Some("per-request-key"))
            .await
            .unwrap();
        assert!(matches!(
            result,
            NormalizedResult::Success { status: 200, .. }
        ));
    }

    #[tokio::test]
    async fn test_full_pipeline_against_mock() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/personalBests"))
            .and(query_param("mode", "time"))
            .and(query_param("mode2", "60"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&mock_server)
            .await;

        let service = service_with_key(Some(mock_server.uri()), Some("key"));
        let result = service
            .invoke("get_personal_bests", &args(json!({})), None)
            .await
            .unwrap();
        assert!(matches!(
            result,
            NormalizedResult::Success { status: 200, .. }
        ));
    }
}
