//! Retry policy applied to every outbound request.
//!
//! The policy is independent of any endpoint: it only knows which statuses
//! are transient, how many retries are allowed and how long to wait between
//! them. Delays grow exponentially (`factor * 2^(n - 1)` seconds before the
//! n-th consecutive retry, nothing before the first one) up to a cap.

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::RetryConfig;

/// Retry/backoff settings shared by all API clients.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_factor: f64,
    backoff_max: Duration,
    statuses: Vec<u16>,
    respect_retry_after: bool,
}

impl RetryPolicy {
    /// Create a policy retrying `statuses` up to `max_retries` times.
    pub fn new(max_retries: u32, backoff_factor: f64, statuses: Vec<u16>) -> Self {
        Self {
            max_retries,
            backoff_factor: backoff_factor.max(0.0),
            backoff_max: Duration::from_secs(120),
            statuses,
            respect_retry_after: true,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, 0.0, Vec::new())
    }

    /// Cap on a single backoff delay.
    pub fn with_backoff_max(mut self, backoff_max: Duration) -> Self {
        self.backoff_max = backoff_max;
        self
    }

    /// Whether a `Retry-After` header overrides the computed delay.
    pub fn with_retry_after(mut self, respect: bool) -> Self {
        self.respect_retry_after = respect;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns `true` when `status` is one of the transient statuses.
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status.as_u16())
    }

    /// Delay to wait after `failures` consecutive failed attempts.
    pub fn backoff(&self, failures: u32) -> Duration {
        if failures <= 1 {
            return Duration::ZERO;
        }
        let exponent = (failures - 1).min(63) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        let max = self.backoff_max.as_secs_f64();
        Duration::try_from_secs_f64(secs.min(max)).unwrap_or(self.backoff_max)
    }

    /// Delay before retrying a response with `status`, honouring a
    /// `Retry-After` header (in seconds) on 429 and 503 answers.
    pub fn delay_for(&self, failures: u32, status: StatusCode, retry_after: Option<u64>) -> Duration {
        let honours_header = matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
        );
        match retry_after {
            Some(secs) if self.respect_retry_after && honours_header => Duration::from_secs(secs),
            _ => self.backoff(failures),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new(
            config.max_retries,
            config.backoff_factor_secs,
            config.statuses.clone(),
        )
        .with_backoff_max(Duration::from_secs(config.backoff_max_secs))
        .with_retry_after(config.respect_retry_after)
    }
}
