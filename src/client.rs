//! Strategy backend client
//!
//! The backend exposes two JSON endpoints with the same contract:
//! `POST /update_params` applies a configuration and `POST /start` begins
//! execution with it. Response bodies are opaque and passed through.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::types::OrderConfiguration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const UPDATE_PARAMS_PATH: &str = "update_params";
pub const START_PATH: &str = "start";

/// The two remote procedures the submission pipeline depends on
#[async_trait]
pub trait StrategyApi: Send + Sync {
    /// Apply `config` on the backend
    async fn update_params(&self, config: &OrderConfiguration) -> Result<Value, RemoteError>;

    /// Start strategy execution with `config`
    async fn start(&self, config: &OrderConfiguration) -> Result<Value, RemoteError>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("strategy-launcher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// reqwest-backed [`StrategyApi`]
#[derive(Debug, Clone)]
pub struct HttpStrategyClient {
    base_url: String,
    client: Client,
}

impl HttpStrategyClient {
    /// Create a client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(
        base_url: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_configuration(
        &self,
        path: &str,
        config: &OrderConfiguration,
    ) -> Result<Value, RemoteError> {
        let url = self.endpoint(path);
        debug!(%url, order_type = %config.variant(), "POST");

        // .json() sets Content-Type: application/json
        let response = self.client.post(&url).json(config).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Backend rejected request");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_body(&body)
    }
}

/// Empty bodies count as JSON `null`
fn parse_body(body: &str) -> Result<Value, RemoteError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| RemoteError::InvalidBody(e.to_string()))
}

#[async_trait]
impl StrategyApi for HttpStrategyClient {
    async fn update_params(&self, config: &OrderConfiguration) -> Result<Value, RemoteError> {
        self.post_configuration(UPDATE_PARAMS_PATH, config).await
    }

    async fn start(&self, config: &OrderConfiguration) -> Result<Value, RemoteError> {
        self.post_configuration(START_PATH, config).await
    }
}
