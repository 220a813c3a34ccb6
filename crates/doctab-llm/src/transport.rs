//! Shared HTTP transport with retry and exponential backoff
//!
//! Providers build their JSON bodies and hand them to [`HttpTransport`],
//! which owns the `reqwest` client and a current-thread tokio runtime so the
//! synchronous [`LlmProvider`](doctab_domain::traits::LlmProvider) capability
//! can drive the async client without a surrounding runtime.

use crate::config::LlmConfig;
use crate::LlmError;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP statuses worth another attempt
pub const TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Whether a status code is in the retry set
pub fn is_transient(status: u16) -> bool {
    TRANSIENT_STATUSES.contains(&status)
}

/// Sleep before retry number `retry` (1-based): `factor * 2^(retry - 1)` seconds
pub fn backoff_delay(factor: f64, retry: u32) -> Duration {
    let exponent = retry.saturating_sub(1).min(30) as i32;
    Duration::try_from_secs_f64(factor * 2f64.powi(exponent)).unwrap_or(Duration::MAX)
}

/// Retrying JSON-over-HTTP POST client
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    retries: u32,
    backoff: f64,
}

/// Authentication attached to a request
#[derive(Clone, Copy)]
pub(crate) enum Auth<'a> {
    Bearer(&'a str),
    QueryKey(&'a str),
}

impl HttpTransport {
    pub(crate) fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;

        Ok(Self {
            client,
            runtime,
            retries: config.retries,
            backoff: config.retry_backoff,
        })
    }

    /// POST `body` as JSON and return the response text of the first 2xx reply
    pub(crate) fn post_json<B: Serialize>(
        &self,
        url: &str,
        auth: Auth<'_>,
        body: &B,
    ) -> Result<String, LlmError> {
        self.runtime.block_on(self.post_json_async(url, auth, body))
    }

    async fn post_json_async<B: Serialize>(
        &self,
        url: &str,
        auth: Auth<'_>,
        body: &B,
    ) -> Result<String, LlmError> {
        let mut retry = 0;

        loop {
            let request = self.client.post(url).json(body);
            let request = match auth {
                Auth::Bearer(token) => request.bearer_auth(token),
                Auth::QueryKey(key) => request.query(&[("key", key)]),
            };

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!("HTTP {} from {}", status, url);
                        return response.text().await.map_err(|e| {
                            LlmError::Communication(format!("Failed to read response body: {}", e))
                        });
                    }

                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    if !is_transient(status.as_u16()) || retry >= self.retries {
                        return Err(LlmError::Http {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    warn!("HTTP {} from {}, retrying ({}/{})", status, url, retry + 1, self.retries);
                }
                Err(e) => {
                    if retry >= self.retries {
                        return Err(LlmError::Communication(format!("Request failed: {}", e)));
                    }
                    warn!("Request to {} failed: {}, retrying ({}/{})", url, e, retry + 1, self.retries);
                }
            }

            retry += 1;
            tokio::time::sleep(backoff_delay(self.backoff, retry)).await;
        }
    }
}
