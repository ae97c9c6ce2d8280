//! Shared HTTP plumbing for the API clients.
//!
//! [`HttpClient`] wraps a single `reqwest::Client` (and therefore a single
//! connection pool) with a [`RetryPolicy`]. It knows nothing about the APIs it
//! talks to; each client builds its own URLs and interprets error payloads.

pub mod retry;

pub use retry::RetryPolicy;

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::{Result, ScraperError};

/// Retrying JSON GET client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Build a client with the given policy and per-attempt timeout.
    pub fn new(policy: RetryPolicy, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, policy })
    }

    /// Build a client from the `[retry]` configuration section.
    pub fn from_config(config: &RetryConfig) -> Result<Self> {
        Self::new(
            RetryPolicy::from(config),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Transient statuses and connection/timeout failures are retried
    /// according to the policy. Any other status is returned to the caller
    /// together with its decoded body, since the APIs report their errors in
    /// the JSON payload.
    pub async fn get_json(
        &self,
        service: &'static str,
        url: Url,
        headers: HeaderMap,
    ) -> Result<serde_json::Value> {
        let display_url = redacted(&url);
        let mut failures = 0u32;

        loop {
            debug!(service, url = %display_url, attempt = failures + 1, "GET");

            let result = self
                .client
                .get(url.clone())
                .headers(headers.clone())
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e)
                    if (e.is_connect() || e.is_timeout())
                        && failures < self.policy.max_retries() =>
                {
                    failures += 1;
                    let wait = self.policy.backoff(failures);
                    warn!(
                        service,
                        url = %display_url,
                        retry = failures,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Err(e) => {
                    return Err(ScraperError::Transport {
                        url: display_url,
                        source: e,
                    })
                }
            };

            let status = response.status();
            if self.policy.is_retryable(status) {
                if failures >= self.policy.max_retries() {
                    return Err(ScraperError::RetriesExhausted {
                        url: display_url,
                        status: status.as_u16(),
                        attempts: failures + 1,
                    });
                }
                failures += 1;
                let wait = self
                    .policy
                    .delay_for(failures, status, retry_after(response.headers()));
                warn!(
                    service,
                    url = %display_url,
                    status = status.as_u16(),
                    retry = failures,
                    wait_ms = wait.as_millis() as u64,
                    "Transient status, backing off"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let body = response.bytes().await.map_err(|e| ScraperError::Transport {
                url: display_url.clone(),
                source: e,
            })?;

            return match serde_json::from_slice(&body) {
                Ok(value) => Ok(value),
                Err(_) if !status.is_success() => Err(ScraperError::api(
                    service,
                    format!("{} returned {}", display_url, status_text(status)),
                )),
                Err(e) => Err(ScraperError::decode(format!("{service} response"), e)),
            };
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// URL without its query string, so keys and signatures stay out of logs.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
