//! Shared HTTP client for backend adapters
//!
//! Wraps `reqwest` with connect/read bounds, a `governor` rate limiter and
//! bounded retries of HTTP 429, and classifies every call into a
//! [`BackendOutcome`] instead of returning transport errors.

use super::retry_policy::{is_retryable_status, RateLimitInfo, RetryPolicy};
use crate::modules::jobs::domain::result::{BackendOutcome, JobResult};
use crate::shared::config::HttpTimeouts;
use crate::shared::errors::{AppError, AppResult};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

type DirectRateLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

const USER_AGENT: &str = concat!("showsync/", env!("CARGO_PKG_VERSION"));

/// Result of one classified backend call.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub outcome: BackendOutcome,
    pub status: Option<StatusCode>,
    /// Parsed JSON body of a successful response, if it had one.
    pub body: Option<Value>,
    pub message: Option<String>,
}

impl BackendResponse {
    pub fn into_job_result(self) -> JobResult {
        match self.outcome {
            BackendOutcome::Success => JobResult::success(),
            outcome => JobResult::failure(
                outcome,
                self.message.unwrap_or_else(|| outcome.to_string()),
            ),
        }
    }
}

/// Map an HTTP status to a backend outcome.
pub fn classify_status(status: StatusCode) -> BackendOutcome {
    match status.as_u16() {
        200..=299 => BackendOutcome::Success,
        401 | 403 => BackendOutcome::AuthError,
        404 => BackendOutcome::NotFound,
        500..=599 => BackendOutcome::ServerError,
        _ => BackendOutcome::ClientError,
    }
}

/// Map a transport failure to a backend outcome.
pub fn classify_transport_error(error: &reqwest::Error) -> BackendOutcome {
    if error.is_builder() {
        // The request could never be sent; retrying will not help
        BackendOutcome::ClientError
    } else {
        BackendOutcome::ConnectionError
    }
}

/// HTTP client that handles rate limiting, 429 retries and classification
pub struct BackendClient {
    client: Client,
    rate_limiter: DirectRateLimiter,
    retry_policy: RetryPolicy,
    backend_name: String,
}

impl BackendClient {
    /// Client for the cloud backend
    pub fn for_cloud(timeouts: HttpTimeouts) -> AppResult<Self> {
        Self::new("Cloud", RetryPolicy::cloud(), timeouts, 5.0, 10)
    }

    /// Client for the social backend (1 req/sec sustained, small bursts)
    pub fn for_social(timeouts: HttpTimeouts) -> AppResult<Self> {
        Self::new("Social", RetryPolicy::social(), timeouts, 1.0, 3)
    }

    pub fn new(
        backend_name: &str,
        retry_policy: RetryPolicy,
        timeouts: HttpTimeouts,
        requests_per_second: f64,
        burst_size: u32,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: Self::create_rate_limiter(requests_per_second, burst_size)?,
            retry_policy,
            backend_name: backend_name.to_string(),
        })
    }

    /// Create a rate limiter with specified requests per second and burst capacity
    fn create_rate_limiter(requests_per_second: f64, burst_size: u32) -> AppResult<DirectRateLimiter> {
        if requests_per_second <= 0.0 {
            return Err(AppError::ConfigError(format!(
                "Request rate must be positive, got {}",
                requests_per_second
            )));
        }

        let period = Duration::from_secs_f64(1.0 / requests_per_second);
        let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period)
            .ok_or_else(|| AppError::ConfigError("Request period must be non-zero".to_string()))?
            .allow_burst(burst);

        Ok(GovernorRateLimiter::direct(quota))
    }

    /// Send a JSON request and classify the response.
    pub async fn send_json(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: &Value,
    ) -> BackendResponse {
        for attempt in 0..=self.retry_policy.max_retries {
            self.rate_limiter.until_ready().await;

            debug!(backend = %self.backend_name, %method, url, attempt, "sending request");

            let result = self
                .client
                .request(method.clone(), url)
                .headers(headers.clone())
                .header(reqwest::header::ACCEPT, "application/json")
                .json(body)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    let outcome = classify_transport_error(&e);
                    warn!(backend = %self.backend_name, url, error = %e, "request failed");
                    return BackendResponse {
                        outcome,
                        status: None,
                        body: None,
                        message: Some(format!("{} request failed: {}", self.backend_name, e)),
                    };
                }
            };

            let status = response.status();

            if is_retryable_status(status) && attempt < self.retry_policy.max_retries {
                let info = RateLimitInfo::from_headers(response.headers());
                let delay = self
                    .retry_policy
                    .calculate_delay(attempt, info.recommended_delay());
                warn!(
                    backend = %self.backend_name,
                    attempt = attempt + 1,
                    max_attempts = self.retry_policy.max_retries + 1,
                    ?delay,
                    "rate limited, waiting before retry"
                );
                sleep(delay).await;
                continue;
            }

            let outcome = classify_status(status);
            if outcome != BackendOutcome::Success {
                let detail = response.text().await.unwrap_or_default();
                debug!(backend = %self.backend_name, %status, %outcome, "request rejected");
                return BackendResponse {
                    outcome,
                    status: Some(status),
                    body: None,
                    message: Some(Self::error_message(&self.backend_name, status, &detail)),
                };
            }

            // An unreadable success body still means the change was accepted
            let body = match response.text().await {
                Ok(text) if !text.trim().is_empty() => serde_json::from_str(&text).ok(),
                _ => None,
            };

            return BackendResponse {
                outcome,
                status: Some(status),
                body,
                message: None,
            };
        }

        // Only reachable when every attempt was rate limited
        BackendResponse {
            outcome: BackendOutcome::ClientError,
            status: Some(StatusCode::TOO_MANY_REQUESTS),
            body: None,
            message: Some(format!(
                "{} rate limit exceeded after {} attempts",
                self.backend_name,
                self.retry_policy.max_retries + 1
            )),
        }
    }

    fn error_message(backend_name: &str, status: StatusCode, detail: &str) -> String {
        let detail = detail.trim();
        if detail.is_empty() {
            format!("{} returned {}", backend_name, status)
        } else if detail.len() > 200 {
            let cut = (0..=200).rev().find(|i| detail.is_char_boundary(*i)).unwrap_or(0);
            format!("{} returned {}: {}...", backend_name, status, &detail[..cut])
        } else {
            format!("{} returned {}: {}", backend_name, status, detail)
        }
    }

    /// Check if a request can be made now (for testing/debugging)
    pub fn can_make_request_now(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
