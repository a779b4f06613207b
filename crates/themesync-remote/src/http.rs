//! HTTP client for the configuration service
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | current document | GET | `current-config` |
//! | save | POST | `config` |
//! | list presets | GET | `presets` |
//! | create preset | POST | `presets` |
//! | update preset | PUT | `presets/{id}` |
//! | delete preset | DELETE | `presets/{id}` |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use themesync_document::{
    ConfigContext, ConfigurationDocument, NewPreset, PresetDocument, PresetUpdate,
};

use crate::store::{RemoteConfig, RemoteConfigStore, StoreError};

const USER_AGENT: &str = concat!("themesync/", env!("CARGO_PKG_VERSION"));

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`RemoteConfigStore`] over HTTP with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpConfigStore {
    client: Client,
    base_url: String,
}

impl HttpConfigStore {
    /// Client rooted at `base_url`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send(request: RequestBuilder, token: &str) -> Result<Response, StoreError> {
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "store returned error status");
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StoreError::Unauthorized(status.as_u16())
            }
            StatusCode::NOT_FOUND => StoreError::NotFound(body),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                StoreError::Rejected(body)
            }
            _ => StoreError::Status {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        token: &str,
    ) -> Result<T, StoreError> {
        Self::send(request, token)
            .await?
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Decode the current-config body.
///
/// Accepts `null`, a bare document, or an envelope
/// `{ "config": ..., "source": ..., "isGlobalAdmin": ... }`.
pub(crate) fn decode_current_config(body: JsonValue) -> Result<Option<RemoteConfig>, StoreError> {
    let decode = |e: serde_json::Error| StoreError::Decode(e.to_string());

    match body {
        JsonValue::Null => Ok(None),
        JsonValue::Object(mut map) if map.contains_key("config") => {
            let config = map.remove("config").unwrap_or(JsonValue::Null);
            if config.is_null() {
                return Ok(None);
            }
            let document: ConfigurationDocument = serde_json::from_value(config).map_err(decode)?;
            let context: ConfigContext =
                serde_json::from_value(JsonValue::Object(map)).map_err(decode)?;
            Ok(Some(RemoteConfig::new(document, context)))
        }
        other => {
            let document: ConfigurationDocument = serde_json::from_value(other).map_err(decode)?;
            Ok(Some(RemoteConfig::new(document, ConfigContext::default())))
        }
    }
}

#[async_trait]
impl RemoteConfigStore for HttpConfigStore {
    async fn get_current_config(&self, token: &str) -> Result<Option<RemoteConfig>, StoreError> {
        let request = self.client.get(self.url("current-config"));
        match Self::send_json::<JsonValue>(request, token).await {
            Ok(body) => decode_current_config(body),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save_config(
        &self,
        token: &str,
        document: &ConfigurationDocument,
    ) -> Result<ConfigurationDocument, StoreError> {
        let request = self.client.post(self.url("config")).json(document);
        Self::send_json(request, token).await
    }

    async fn get_presets(&self, token: &str) -> Result<Vec<PresetDocument>, StoreError> {
        Self::send_json(self.client.get(self.url("presets")), token).await
    }

    async fn create_preset(
        &self,
        token: &str,
        preset: &NewPreset,
    ) -> Result<PresetDocument, StoreError> {
        let request = self.client.post(self.url("presets")).json(preset);
        Self::send_json(request, token).await
    }

    async fn update_preset(
        &self,
        token: &str,
        id: &str,
        update: &PresetUpdate,
    ) -> Result<PresetDocument, StoreError> {
        let request = self
            .client
            .put(self.url(&format!("presets/{id}")))
            .json(update);
        Self::send_json(request, token).await
    }

    async fn delete_preset(&self, token: &str, id: &str) -> Result<(), StoreError> {
        let request = self.client.delete(self.url(&format!("presets/{id}")));
        Self::send(request, token).await.map(|_| ())
    }
}
