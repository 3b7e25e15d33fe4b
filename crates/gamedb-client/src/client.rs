//! REST API client.
//!
//! Uses reqwest to call the game-data API. Every call goes through one
//! normalization step: an `{error}` envelope is a failure whatever the
//! status, anything else is decoded into the caller's type.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use gamedb_core::ErrorEnvelope;
use gamedb_core::config::ApiConfig;

use crate::error::{ApiError, ApiResult};
use crate::params::Params;

/// Longest raw body echoed back in a transport error.
const MAX_RAW_BODY: usize = 512;

/// Configuration for connecting to the API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root (e.g., "<https://mhw-db.com>").
    pub base_url: String,
    /// Optional locale path segment appended to the root.
    pub locale: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            locale: api.locale.clone(),
            request_timeout: api.request_timeout(),
        }
    }
}

/// Game-data REST API client.
///
/// Cheap to clone; clones share the HTTP pool and the default bearer header.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let root = config.base_url.trim_end_matches('/');
        if root.is_empty() {
            return Err(ApiError::Config("base_url is empty".into()));
        }
        Url::parse(root).map_err(|e| ApiError::Config(format!("invalid base_url: {e}")))?;

        let base_url = match config.locale.as_deref().map(|l| l.trim_matches('/')) {
            Some(locale) if !locale.is_empty() => format!("{root}/{locale}"),
            _ => root.to_string(),
        };

        // reqwest is built with rustls-no-provider; an `Err` only means a
        // provider was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            bearer: Arc::new(RwLock::new(None)),
        })
    }

    /// Locale-qualified API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a resource path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Attach `Authorization: Bearer <token>` to every subsequent request.
    pub fn set_bearer(&self, token: &str) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    pub fn clear_bearer(&self) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        self.request::<(), T>(Method::GET, path, params, None, cancel)
            .await
    }

    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        params: &Params,
    ) -> ApiResult<T> {
        self.request(Method::POST, path, params, Some(body), None)
            .await
    }

    pub async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        params: &Params,
    ) -> ApiResult<T> {
        self.request(Method::PUT, path, params, Some(body), None)
            .await
    }

    pub async fn patch<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        params: &Params,
    ) -> ApiResult<T> {
        self.request(Method::PATCH, path, params, Some(body), None)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, params: &Params) -> ApiResult<T> {
        self.request::<(), T>(Method::DELETE, path, params, None, None)
            .await
    }

    /// Issue one request. When `cancel` fires first the in-flight request is
    /// dropped and `ApiError::Cancelled` returned.
    pub async fn request<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<&B>,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| ApiError::Config(format!("invalid request URL for {path}: {e}")))?;
        params.apply(&mut url);

        debug!(method = %method, url = %url, "API request");

        let mut builder = self.http.request(method, url);
        if let Some(token) = self.bearer() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status().as_u16();
            let text = resp.text().await?;
            normalize::<T>(status, &text)
        };

        let result = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(ApiError::Cancelled),
                    result = exchange => result,
                }
            }
            None => exchange.await,
        };

        if let Err(ref e) = result {
            match e {
                ApiError::Domain(err) => debug!(path, code = %err.code, "API returned error envelope"),
                ApiError::Cancelled => debug!(path, "API request cancelled"),
                other => warn!(path, error = %other, "API request failed"),
            }
        }
        result
    }
}

/// Map a raw response to the caller's type.
pub(crate) fn normalize<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    let payload: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|_| ApiError::Transport {
            status: Some(status),
            message: truncate(body),
        })?
    };

    if let Some(err) = ErrorEnvelope::detect(&payload) {
        return Err(ApiError::Domain(err));
    }
    if !(200..300).contains(&status) {
        return Err(ApiError::Transport {
            status: Some(status),
            message: format!("unexpected status {status}"),
        });
    }

    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_RAW_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
