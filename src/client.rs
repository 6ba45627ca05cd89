//! Client for action-dispatch endpoints.
//!
//! Speaks the same `{action, data}` / `{status, data|message}` contract the
//! server exposes, so it can reach either this service or a remote collaborator
//! implementing it. Calls are never retried; a failed call surfaces as
//! [`Error::ExternalService`].

use crate::{
    api::response::ApiResponse,
    errors::{Error, Result},
};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Configuration for the action client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Full URL actions are posted to
    pub endpoint: String,
    /// Timeout for a single call
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize)]
struct ActionRequest<'a, D> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a D>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Builds a client for `config.endpoint`.
    ///
    /// # Errors
    /// [`Error::Config`] if the HTTP client cannot be constructed.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Invokes `action` with an optional payload and returns the `data` of a
    /// success envelope.
    #[instrument(skip(self, data), fields(endpoint = %self.config.endpoint))]
    pub async fn call<D, T>(&self, action: &str, data: Option<&D>) -> Result<T>
    where
        D: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!("Dispatching action");

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&ActionRequest { action, data })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) => envelope.into_result().inspect_err(|e| {
                warn!(%status, "Action {action} failed: {e}");
            }),
            Err(parse_error) if status.is_success() => Err(Error::ExternalService {
                message: format!("Malformed response to {action}: {parse_error}"),
            }),
            Err(_) => Err(Error::ExternalService {
                message: format!("{action} failed with HTTP {status}: {}", truncate(&body)),
            }),
        }
    }
}

fn truncate(body: &str) -> &str {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}
