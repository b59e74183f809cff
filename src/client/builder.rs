use super::core::VectorClient;
use super::policy::RetryPolicy;
use crate::transport::{AsyncExchange, BlockingHttpTransport, Exchange, HttpTransport};
use crate::{Error, ErrorContext, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Production endpoint of the Hashub Vector API.
pub const DEFAULT_BASE_URL: &str = "https://vector.hashub.dev";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved, immutable client configuration. Shared read-only by all calls.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Time budget of a single attempt.
    pub timeout: Duration,
    /// Optional deadline of a whole logical call, across attempts and waits.
    pub total_timeout: Option<Duration>,
    pub retry: RetryPolicy,
    pub proxy: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("total_timeout", &self.total_timeout)
            .field("retry", &self.retry)
            .field("proxy", &self.proxy)
            .finish()
    }
}

fn redact(key: &str) -> String {
    let prefix: String = key.chars().take(6).collect();
    format!("{}***", prefix)
}

fn config_error(msg: impl Into<String>, field: &str) -> Error {
    Error::validation_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("client_builder"),
    )
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// Builder for creating clients with custom configuration.
///
/// Unset values fall back to the environment, then to defaults:
/// - `HASHUB_API_KEY` (required if `api_key` is not called)
/// - `HASHUB_BASE_URL` (default `https://vector.hashub.dev`)
/// - `HASHUB_TIMEOUT_SECS` (default 30)
/// - `HASHUB_MAX_ATTEMPTS` (default 3)
/// - `HASHUB_PROXY_URL`
#[derive(Debug, Clone)]
pub struct VectorClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    total_timeout: Option<Duration>,
    max_attempts: Option<u32>,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
    proxy: Option<String>,
}

impl VectorClientBuilder {
    pub fn new() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            api_key: None,
            base_url: None,
            timeout: None,
            total_timeout: None,
            max_attempts: None,
            base_delay: defaults.base_delay,
            max_delay: defaults.max_delay,
            jitter: defaults.jitter,
            proxy: None,
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Time budget of each attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Deadline for each logical call, across all attempts and backoff waits.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = Some(timeout);
        self
    }

    /// Total attempts per call, including the first.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn jitter(mut self, enable: bool) -> Self {
        self.jitter = enable;
        self
    }

    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Resolves environment fallbacks and validates the configuration.
    pub fn config(self) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("HASHUB_API_KEY").ok())
            .ok_or_else(|| config_error("API key required (HASHUB_API_KEY)", "api_key"))?;
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(config_error("API key must be non-empty", "api_key"));
        }

        let base_url = self
            .base_url
            .or_else(|| std::env::var("HASHUB_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let parsed = url::Url::parse(base_url.trim())
            .map_err(|e| config_error(format!("Invalid base URL '{}': {}", base_url, e), "base_url"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(config_error(
                format!("Base URL must use http or https, got '{}'", parsed.scheme()),
                "base_url",
            ));
        }
        let base_url = parsed.as_str().trim_end_matches('/').to_string();

        let timeout = self
            .timeout
            .or_else(|| env_parse::<u64>("HASHUB_TIMEOUT_SECS").map(Duration::from_secs))
            .unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(config_error("Timeout must be greater than zero", "timeout"));
        }
        if self.total_timeout.map_or(false, |t| t.is_zero()) {
            return Err(config_error(
                "Total timeout must be greater than zero",
                "total_timeout",
            ));
        }

        let max_attempts = self
            .max_attempts
            .or_else(|| env_parse::<u32>("HASHUB_MAX_ATTEMPTS"))
            .unwrap_or(RetryPolicy::default().max_attempts);
        if max_attempts == 0 {
            return Err(config_error("max_attempts must be at least 1", "max_attempts"));
        }

        let proxy = self
            .proxy
            .or_else(|| std::env::var("HASHUB_PROXY_URL").ok())
            .filter(|p| !p.trim().is_empty());

        Ok(ClientConfig {
            api_key,
            base_url,
            timeout,
            total_timeout: self.total_timeout,
            retry: RetryPolicy {
                max_attempts,
                base_delay: self.base_delay,
                max_delay: self.max_delay.max(self.base_delay),
                jitter: self.jitter,
            },
            proxy,
        })
    }

    /// Builds the async client with a reqwest session.
    pub fn build(self) -> Result<VectorClient> {
        let config = self.config()?;
        let transport = HttpTransport::new(&config)?;
        Ok(VectorClient::from_parts(config, Arc::new(transport)))
    }

    /// Builds the async client over a custom exchange capability.
    pub fn build_with_transport(self, transport: Arc<dyn AsyncExchange>) -> Result<VectorClient> {
        Ok(VectorClient::from_parts(self.config()?, transport))
    }

    /// Builds the blocking client with a reqwest blocking session.
    ///
    /// Must not be called from inside an async runtime.
    pub fn build_blocking(self) -> Result<crate::blocking::VectorClient> {
        let config = self.config()?;
        let transport = BlockingHttpTransport::new(&config)?;
        Ok(crate::blocking::VectorClient::from_parts(config, Arc::new(transport)))
    }

    /// Builds the blocking client over a custom exchange capability.
    pub fn build_blocking_with_transport(
        self,
        transport: Arc<dyn Exchange>,
    ) -> Result<crate::blocking::VectorClient> {
        Ok(crate::blocking::VectorClient::from_parts(self.config()?, transport))
    }
}

impl Default for VectorClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
