// src/utils/http.rs

//! HTTP fetch client with bounded retries.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};

use crate::config::StatusConfig;
use crate::error::{AppError, Result};

/// First retry delay; doubles per attempt.
const BASE_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on a single backoff wait.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Fetches the status page with retry and exponential backoff.
pub struct FetchClient {
    client: reqwest::Client,
    url: String,
    retries: u32,
}

impl FetchClient {
    /// Create a configured fetch client.
    pub fn new(config: &StatusConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=60"));

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            retries: config.retries,
        })
    }

    /// Fetch the page body, retrying transient failures.
    ///
    /// Network-class errors and 429/5xx statuses retry up to the
    /// configured count with exponential backoff; the final error
    /// surfaces to the caller.
    pub async fn fetch_text(&self) -> Result<String> {
        let mut attempt: u32 = 0;

        loop {
            match self.try_fetch().await {
                Ok(body) => return Ok(body),
                Err(error) if attempt < self.retries && error.is_retryable() => {
                    let delay = backoff_delay(attempt);
                    attempt += 1;
                    log::warn!(
                        "Retry attempt {} for {} after error: {}",
                        attempt,
                        self.url,
                        error
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn try_fetch(&self) -> Result<String> {
        let started = Instant::now();
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        log::info!(
            "GET {} {} {}ms",
            self.url,
            status.as_u16(),
            started.elapsed().as_millis()
        );
        Ok(body)
    }
}

/// Exponential backoff: `BASE_DELAY * 2^attempt`, capped at [`MAX_DELAY`].
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.min(16));
    BASE_DELAY
        .checked_mul(factor)
        .map_or(MAX_DELAY, |delay| delay.min(MAX_DELAY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(2), Duration::from_millis(400));
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn backoff_caps_at_thirty_seconds() {
        assert_eq!(backoff_delay(9), Duration::from_secs(30));
        assert_eq!(backoff_delay(32), Duration::from_secs(30));
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(FetchClient::new(&StatusConfig::default()).is_ok());
    }
}
