use crate::domain::ports::HttpTransport;
use crate::utils::error::{CinemaError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_SECONDS: f64 = 2.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub backoff_base_seconds: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_seconds: DEFAULT_BACKOFF_BASE_SECONDS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base_seconds: f64) -> Self {
        Self {
            max_attempts,
            backoff_base_seconds,
        }
    }

    /// Wait before the given 1-based attempt: nothing before the first one,
    /// then `base^(attempt - 1)` seconds, uncapped.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let seconds = self.backoff_base_seconds.powi(exponent).max(0.0);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }
}

/// reqwest 實作；連線池由 `Client` 共用
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, uri: &str, headers: &HeaderMap) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(uri)
            .headers(headers.clone())
            // 避免中間層快取把失敗回應重播給後續的重試
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("GET {} -> {}", uri, status);

        if !status.is_success() {
            return Err(CinemaError::HttpStatus {
                uri: uri.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

/// Wraps a single-attempt transport with bounded retries and exponential backoff.
/// Retry state lives on the stack of each `get` call, so one slow provider never
/// delays another.
#[derive(Debug, Clone)]
pub struct ResilientHttpClient<T: HttpTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: HttpTransport> ResilientHttpClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get(&self, uri: &str, headers: &HeaderMap) -> Result<Vec<u8>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.transport.get(uri, headers).await {
                Ok(body) => {
                    if attempt > 1 {
                        tracing::debug!("GET {} succeeded on attempt {}/{}", uri, attempt, max_attempts);
                    }
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ HTTP GET {} failed (attempt {}/{}): {}",
                        uri,
                        attempt,
                        max_attempts,
                        e
                    );

                    if !e.is_retryable() || attempt >= max_attempts {
                        return Err(CinemaError::ProviderFailure {
                            uri: uri.to_string(),
                            attempts: attempt,
                            source: Box::new(e),
                        });
                    }

                    attempt += 1;
                    let delay = self.policy.delay_before(attempt);
                    tracing::debug!("Retrying {} in {:?}", uri, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
