//! 传输层：单次 HTTP 交换能力（阻塞与异步）。
//!
//! HTTP transport.
//!
//! A transport performs exactly one network exchange: no retries, no status
//! interpretation. The retry state machine in [`crate::client`] drives it
//! through one of two capabilities:
//!
//! - [`Exchange`]: blocking, occupies the calling thread
//! - [`AsyncExchange`]: suspends at the network wait
//!
//! [`HttpTransport`] and [`BlockingHttpTransport`] are the reqwest-backed
//! implementations. Custom implementations can be injected through
//! [`crate::VectorClientBuilder::build_with_transport`] and
//! [`crate::VectorClientBuilder::build_blocking_with_transport`].

mod blocking;
mod http;

pub use blocking::BlockingHttpTransport;
pub use http::HttpTransport;

use async_trait::async_trait;
use reqwest::Method;
use std::time::Duration;

/// One HTTP exchange to perform against the configured base URL.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`.
    pub path: String,
    /// JSON body; `None` for GET.
    pub body: Option<serde_json::Value>,
    /// Correlation id, identical across the attempts of one logical call.
    pub request_id: String,
}

impl ExchangeRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Model named in the request body, if any.
    pub fn model(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("model"))
            .and_then(|m| m.as_str())
    }
}

/// Status, rate-limit hint and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed `Retry-After` header.
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Local failure of an exchange (no HTTP response was obtained).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Blocking "perform one exchange" capability.
///
/// Implementations must return within roughly `timeout`, reporting
/// [`TransportError::Timeout`] when it elapses.
pub trait Exchange: Send + Sync {
    fn exchange(
        &self,
        request: &ExchangeRequest,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Suspendable "perform one exchange" capability.
///
/// The caller additionally bounds the future by `timeout`, so implementations
/// only need to be cancel-safe.
#[async_trait]
pub trait AsyncExchange: Send + Sync {
    async fn exchange(
        &self,
        request: &ExchangeRequest,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Parses a `Retry-After` value given in (possibly fractional) seconds.
///
/// HTTP-date values and values a [`Duration`] cannot hold yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    retry_after_secs(secs)
}

/// Seconds from an untrusted hint; negative, non-finite or oversized values are dropped.
pub(crate) fn retry_after_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

pub(crate) fn user_agent() -> String {
    format!("hashub-vector-rust/{}", env!("CARGO_PKG_VERSION"))
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn retry_after_header(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_parse_retry_after_rejects_unrepresentable() {
        assert_eq!(parse_retry_after("1e20"), None);
        assert_eq!(parse_retry_after("inf"), None);
        assert_eq!(parse_retry_after("NaN"), None);
        assert_eq!(retry_after_secs(f64::MAX), None);
        assert_eq!(retry_after_secs(1e9), Some(Duration::from_secs(1_000_000_000)));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://vector.hashub.dev/", "/v1/usage"),
            "https://vector.hashub.dev/v1/usage"
        );
        assert_eq!(
            join_url("http://127.0.0.1:1234", "/v1/vectorize"),
            "http://127.0.0.1:1234/v1/vectorize"
        );
    }

    #[test]
    fn test_request_model_and_ids() {
        let a = ExchangeRequest::post(
            "/v1/vectorize",
            serde_json::json!({"text": "hi", "model": "e5_base"}),
        );
        let b = ExchangeRequest::get("/v1/usage");
        assert_eq!(a.model(), Some("e5_base"));
        assert_eq!(b.model(), None);
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(b.method, Method::GET);
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "{}").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(301, "").is_success());
        assert!(!RawResponse::new(503, "").is_success());
    }
}
