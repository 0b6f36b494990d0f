/// Algod REST client for reading application state
use crate::config::{NodeConfig, DEFAULT_TOKEN_HEADER, SANDBOX_ALGOD_ADDRESS, SANDBOX_ALGOD_TOKEN};
use crate::error::NodeError;
use crate::types::{AccountApplicationInfo, ApplicationInfo, BoxResponse, BoxesResponse};
use base64::Engine;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 5_000;

/// Client for the algod v2 HTTP API (read-only endpoints)
#[derive(Debug, Clone)]
pub struct AlgodClient {
    pub endpoint: String,
    token: String,
    token_header: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl AlgodClient {
    /// Create a new client with the given endpoint and token
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self::with_options(endpoint, token, DEFAULT_TOKEN_HEADER, Duration::from_secs(30), 3)
    }

    /// Create a client connected to the local sandbox
    pub fn sandbox() -> Self {
        Self::new(SANDBOX_ALGOD_ADDRESS, SANDBOX_ALGOD_TOKEN)
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::with_options(
            &config.algod_address,
            &config.algod_token,
            config.token_header(),
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )
    }

    fn with_options(
        endpoint: &str,
        token: &str,
        token_header: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
            token_header: token_header.to_string(),
            max_retries,
            client,
        }
    }

    /// Application parameters, including global state
    pub async fn application_info(&self, app_id: u64) -> Result<ApplicationInfo, NodeError> {
        self.get(&format!("/v2/applications/{}", app_id), &[]).await
    }

    /// Local state an account holds for an application
    pub async fn account_application_info(
        &self,
        address: &str,
        app_id: u64,
    ) -> Result<AccountApplicationInfo, NodeError> {
        self.get(
            &format!("/v2/accounts/{}/applications/{}", address, app_id),
            &[],
        )
        .await
    }

    /// Single box by name
    pub async fn application_box_by_name(
        &self,
        app_id: u64,
        name: &[u8],
    ) -> Result<BoxResponse, NodeError> {
        self.get(
            &format!("/v2/applications/{}/box", app_id),
            &[("name", box_name_query(name))],
        )
        .await
    }

    /// Names of all boxes of an application
    pub async fn application_boxes(&self, app_id: u64) -> Result<BoxesResponse, NodeError> {
        self.get(&format!("/v2/applications/{}/boxes", app_id), &[])
            .await
    }

    /// GET with retry on transport failures; HTTP errors are returned as is
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NodeError> {
        let url = format!("{}{}", self.endpoint, path);
        let mut retries = 0u32;

        loop {
            debug!(%url, attempt = retries + 1, "algod request");
            let sent = self
                .client
                .get(&url)
                .header(self.token_header.as_str(), &self.token)
                .query(query)
                .send()
                .await;

            match sent {
                Ok(response) => return parse_response(response).await,
                // builder errors (e.g. an invalid header name) are not retried
                Err(e) if e.is_builder() => return Err(NodeError::Request(e)),
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    let backoff = backoff_delay(retries);
                    warn!(
                        error = %e,
                        attempt = retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "algod request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(NodeError::Request(e)),
            }
        }
    }
}

/// Exponential backoff for the given retry (1-based), capped at `MAX_BACKOFF_MS`
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(BASE_BACKOFF_MS.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, NodeError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| NodeError::InvalidResponse(e.to_string()));
    }

    let message = error_message(&body);
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(NodeError::NotFound(message));
    }
    Err(NodeError::Http {
        status: status.as_u16(),
        message,
    })
}

/// algod reports errors as `{"message": "..."}`
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Box names are passed as `b64:<base64>` so that arbitrary bytes survive the query string
pub fn box_name_query(name: &[u8]) -> String {
    format!(
        "b64:{}",
        base64::engine::general_purpose::STANDARD.encode(name)
    )
}
