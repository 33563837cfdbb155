//! HTTP client with rate limiting and retry logic for abema.tv
//!
//! Every request is checked against the configured origin before it leaves
//! the process. Missing pages fail fast, transient failures are retried
//! after a fixed backoff.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::error::{AbemaError, Result};
use crate::url::{BASE_URL, check_origin};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "ja,en-US;q=0.8,en;q=0.6";
const MAX_REDIRECTS: usize = 5;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin every fetched URL must belong to (default: https://abema.tv)
    pub base_url: String,
    /// Browser identity sent with each request
    pub user_agent: String,
    /// Maximum requests per second, zero disables limiting (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Fixed wait between attempts (default: 2s)
    pub retry_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            requests_per_second: 2.0,
            timeout_secs: 30,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// Rate limiter to control request frequency
///
/// Ensures requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// A non-positive or non-finite rate disables limiting.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Acquire permission to make a request
    ///
    /// Sleeps until the minimum interval since the previous request has elapsed.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Anything that can produce the HTML of a page on the service
///
/// The orchestrator only talks to this trait, so fetching can be swapped for
/// a test double or a concurrent implementation without touching call sites.
pub trait PageSource {
    /// Fetch `url`, making at most `max_retries` attempts
    fn fetch_page(&self, url: &str, max_retries: u32) -> impl Future<Output = Result<String>> + Send;
}

/// Outcome of a single failed attempt
#[derive(Debug)]
enum AttemptError {
    /// Transport error or HTTP error status, worth another attempt
    Retryable(String),
    /// Something retrying cannot fix
    Unexpected(String),
    /// The page is gone or points somewhere we must not go
    Invalid(String),
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        matches!(self, AttemptError::Retryable(_))
    }
}

/// HTTP client wrapper with origin checks, rate limiting and retry logic
pub struct AbemaClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    base_url: Url,
    retry_backoff: Duration,
}

impl AbemaClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// - `InvalidUrl` if `base_url` does not parse
    /// - `HttpClient` if the underlying client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AbemaError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            base_url,
            retry_backoff: config.retry_backoff,
        })
    }

    /// Fetch the HTML of a page on the service
    ///
    /// # Arguments
    /// * `url` - Absolute URL on the configured origin
    /// * `max_retries` - Total number of attempts, zero is treated as one
    ///
    /// # Returns
    /// The non-empty response body
    ///
    /// # Errors
    /// - `InvalidUrl` - URL outside the origin (no request is made), HTTP 404,
    ///   or a redirect leaving the origin
    /// - `NetworkFailure` - all attempts failed, or an error occurred that a
    ///   retry cannot fix
    pub async fn fetch(&self, url: &str, max_retries: u32) -> Result<String> {
        check_origin(url, &self.base_url)?;

        let max_attempts = max_retries.max(1);
        let mut attempt = 1;

        loop {
            self.rate_limiter.acquire().await;
            debug!(url, attempt, "fetching page");

            match self.do_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        url,
                        attempt,
                        max_attempts,
                        error = ?e,
                        "request failed, retrying in {}s",
                        self.retry_backoff.as_secs_f64()
                    );
                    sleep(self.retry_backoff).await;
                    attempt += 1;
                }
                Err(AttemptError::Invalid(reason)) => return Err(AbemaError::InvalidUrl(reason)),
                Err(AttemptError::Retryable(reason)) | Err(AttemptError::Unexpected(reason)) => {
                    return Err(AbemaError::NetworkFailure {
                        url: url.to_string(),
                        attempts: attempt,
                        reason,
                    });
                }
            }
        }
    }

    /// Perform a single attempt, following same-origin redirects by hand
    async fn do_fetch(&self, url: &str) -> std::result::Result<String, AttemptError> {
        let mut current_url = url.to_string();

        for _ in 0..MAX_REDIRECTS {
            let response = self
                .client
                .get(&current_url)
                .send()
                .await
                .map_err(|e| AttemptError::Retryable(e.to_string()))?;

            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(AttemptError::Invalid(format!(
                    "{} does not exist (HTTP 404)",
                    current_url
                )));
            }

            if status.is_client_error() || status.is_server_error() {
                return Err(AttemptError::Retryable(format!("HTTP {}", status)));
            }

            if status.is_redirection() {
                let Some(location) = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                else {
                    return Err(AttemptError::Unexpected(format!(
                        "HTTP {} without a usable Location header",
                        status
                    )));
                };

                let next = Url::parse(&current_url)
                    .and_then(|base| base.join(location))
                    .map_err(|e| AttemptError::Unexpected(format!("bad redirect {location}: {e}")))?;
                check_origin(next.as_str(), &self.base_url)
                    .map_err(|e| AttemptError::Invalid(e.to_string()))?;

                debug!(from = %current_url, to = %next, "following redirect");
                current_url = next.to_string();
                continue;
            }

            let body = response.text().await.map_err(|e| {
                let reason = format!("failed to read body: {e}");
                // Resets and truncated bodies are transport failures
                if e.is_timeout() || e.is_body() || e.is_decode() || e.is_request() {
                    AttemptError::Retryable(reason)
                } else {
                    AttemptError::Unexpected(reason)
                }
            })?;

            if body.trim().is_empty() {
                return Err(AttemptError::Unexpected("empty response body".to_string()));
            }

            return Ok(body);
        }

        Err(AttemptError::Unexpected("too many redirects".to_string()))
    }

    /// Origin this client is allowed to talk to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get a reference to the rate limiter (for testing)
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

impl PageSource for AbemaClient {
    fn fetch_page(&self, url: &str, max_retries: u32) -> impl Future<Output = Result<String>> + Send {
        self.fetch(url, max_retries)
    }
}
