//! Retry policy and the per-call retry state machine.
//!
//! Both call surfaces drive the same [`RetryState`]; they differ only in how
//! they wait (thread sleep vs. timer future).

use crate::transport::ExchangeRequest;
use crate::{Error, ErrorContext, Result};
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Retry configuration shared read-only by all calls of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (>= 1).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further attempt.
    pub base_delay: Duration,
    /// Upper bound of the exponential delay.
    pub max_delay: Duration,
    /// Add up to 10% random delay so concurrent callers spread out.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Exponential delay after the 1-based `attempt` failed:
    /// `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        let base = self.base_delay.as_millis() as u64;
        let cap = self.max_delay.as_millis() as u64;
        let delay = base.saturating_mul(1u64 << exp).min(cap);
        Duration::from_millis(delay)
    }

    fn with_jitter(&self, delay: Duration) -> Duration {
        if !self.jitter {
            return delay;
        }
        let max_jitter_ms = delay.as_millis() as u64 / 10;
        if max_jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter_ms))
    }
}

/// State of one logical call. Created per call and dropped with it.
pub(crate) struct RetryState<'a> {
    policy: &'a RetryPolicy,
    request: &'a ExchangeRequest,
    attempt: u32,
    deadline: Option<Instant>,
    started: Instant,
}

impl<'a> RetryState<'a> {
    pub fn new(
        policy: &'a RetryPolicy,
        request: &'a ExchangeRequest,
        total_timeout: Option<Duration>,
    ) -> Self {
        let started = Instant::now();
        Self {
            policy,
            request,
            attempt: 0,
            deadline: total_timeout.map(|t| started + t),
            started,
        }
    }

    /// Attempts started so far.
    #[cfg(test)]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Starts the next attempt and returns its time budget.
    pub fn begin_attempt(&mut self, attempt_timeout: Duration) -> Result<Duration> {
        let budget = match self.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(self.deadline_exceeded(None));
                }
                remaining.min(attempt_timeout)
            }
            None => attempt_timeout,
        };
        self.attempt += 1;
        debug!(
            method = %self.request.method,
            path = self.request.path.as_str(),
            request_id = self.request.request_id.as_str(),
            attempt = self.attempt,
            budget_ms = budget.as_millis() as u64,
            "hashub-vector attempt"
        );
        Ok(budget)
    }

    pub fn on_success(&self, status: u16) {
        debug!(
            path = self.request.path.as_str(),
            request_id = self.request.request_id.as_str(),
            attempt = self.attempt,
            http_status = status,
            duration_ms = self.started.elapsed().as_millis() as u64,
            "hashub-vector request succeeded"
        );
    }

    /// Decides what follows a failed attempt: `Ok(delay)` to wait and retry,
    /// `Err` to surface. The surfaced error is the classified one, except when
    /// the wait would cross the deadline.
    pub fn on_failure(&mut self, mut err: Error) -> Result<Duration> {
        err.context_mut().request_id = Some(self.request.request_id.clone());

        if !err.is_transient() || self.attempt >= self.policy.max_attempts {
            info!(
                path = self.request.path.as_str(),
                request_id = self.request.request_id.as_str(),
                attempts = self.attempt,
                error_kind = err.kind().name(),
                http_status = err.status_code(),
                duration_ms = self.started.elapsed().as_millis() as u64,
                "hashub-vector request failed"
            );
            return Err(err);
        }

        // A server hint is honoured exactly; otherwise exponential backoff.
        let delay = match err.retry_after() {
            Some(hint) => hint,
            None => self.policy.with_jitter(self.policy.backoff(self.attempt)),
        };

        if let Some(deadline) = self.deadline {
            // An unrepresentable wake-up time is past any deadline.
            let crosses = Instant::now()
                .checked_add(delay)
                .map_or(true, |wake| wake >= deadline);
            if crosses {
                return Err(self.deadline_exceeded(Some(err)));
            }
        }

        warn!(
            path = self.request.path.as_str(),
            request_id = self.request.request_id.as_str(),
            attempt = self.attempt,
            max_attempts = self.policy.max_attempts,
            error_kind = err.kind().name(),
            http_status = err.status_code(),
            delay_ms = delay.as_millis() as u64,
            "hashub-vector retrying after transient failure"
        );
        Ok(delay)
    }

    /// Error for a call aborted through its cancellation token.
    pub fn cancelled(&self) -> Error {
        info!(
            path = self.request.path.as_str(),
            request_id = self.request.request_id.as_str(),
            attempts = self.attempt,
            "hashub-vector request cancelled"
        );
        Error::timeout_with_context(
            format!("Request cancelled after {} attempt(s)", self.attempt),
            ErrorContext::new()
                .with_request_id(self.request.request_id.clone())
                .with_source("cancellation"),
        )
    }

    fn deadline_exceeded(&self, last: Option<Error>) -> Error {
        let elapsed = self.started.elapsed();
        let mut context = ErrorContext::new()
            .with_request_id(self.request.request_id.clone())
            .with_source("deadline");
        if let Some(last) = &last {
            let last_ctx = last.context();
            context.status_code = last_ctx.status_code;
            context.response_body = last_ctx.response_body.clone();
            context = context.with_details(format!("last error: {}", last));
        }
        info!(
            path = self.request.path.as_str(),
            request_id = self.request.request_id.as_str(),
            attempts = self.attempt,
            elapsed_ms = elapsed.as_millis() as u64,
            "hashub-vector request exceeded its deadline"
        );
        Error::timeout_with_context(
            format!(
                "Request exceeded its deadline after {} attempt(s) in {} ms",
                self.attempt,
                elapsed.as_millis()
            ),
            context,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_code::ErrorKind;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_000),
            jitter: false,
        }
    }

    fn server_error(status: u16) -> Error {
        Error::server_with_context("boom", ErrorContext::new().with_status_code(status))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let p = policy(10);
        assert_eq!(p.backoff(1), Duration::from_millis(100));
        assert_eq!(p.backoff(2), Duration::from_millis(200));
        assert_eq!(p.backoff(3), Duration::from_millis(400));
        assert_eq!(p.backoff(4), Duration::from_millis(800));
        assert_eq!(p.backoff(5), Duration::from_millis(1_000));
        assert_eq!(p.backoff(64), Duration::from_millis(1_000));
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let p = RetryPolicy {
            jitter: true,
            ..policy(3)
        };
        for _ in 0..200 {
            let d = p.with_jitter(Duration::from_millis(1_000));
            assert!(d >= Duration::from_millis(1_000));
            assert!(d <= Duration::from_millis(1_100));
        }
    }

    #[test]
    fn test_transient_failures_retry_until_ceiling() {
        let p = policy(3);
        let req = ExchangeRequest::get("/v1/usage");
        let mut state = RetryState::new(&p, &req, None);

        state.begin_attempt(Duration::from_secs(1)).unwrap();
        assert_eq!(state.on_failure(server_error(503)).unwrap(), Duration::from_millis(100));
        state.begin_attempt(Duration::from_secs(1)).unwrap();
        assert_eq!(state.on_failure(server_error(502)).unwrap(), Duration::from_millis(200));
        state.begin_attempt(Duration::from_secs(1)).unwrap();

        let err = state.on_failure(server_error(500)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.context().request_id.as_deref(), Some(req.request_id.as_str()));
        assert_eq!(state.attempt(), 3);
    }

    #[test]
    fn test_non_transient_failure_is_final() {
        let p = policy(3);
        let req = ExchangeRequest::get("/v1/usage");
        let mut state = RetryState::new(&p, &req, None);
        state.begin_attempt(Duration::from_secs(1)).unwrap();
        let err = state
            .on_failure(Error::authentication_with_context(
                "bad key",
                ErrorContext::new().with_status_code(401),
            ))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(state.attempt(), 1);
    }

    #[test]
    fn test_retry_after_hint_is_used_verbatim() {
        let p = RetryPolicy {
            jitter: true,
            ..policy(3)
        };
        let req = ExchangeRequest::get("/v1/usage");
        let mut state = RetryState::new(&p, &req, None);
        state.begin_attempt(Duration::from_secs(1)).unwrap();
        let delay = state
            .on_failure(Error::rate_limit_with_context(
                "slow down",
                Some(Duration::from_millis(1_234)),
                ErrorContext::new().with_status_code(429),
            ))
            .unwrap();
        assert_eq!(delay, Duration::from_millis(1_234));
    }

    #[test]
    fn test_rate_limit_without_hint_uses_backoff() {
        let p = policy(3);
        let req = ExchangeRequest::get("/v1/usage");
        let mut state = RetryState::new(&p, &req, None);
        state.begin_attempt(Duration::from_secs(1)).unwrap();
        let delay = state
            .on_failure(Error::rate_limit_with_context(
                "slow down",
                None,
                ErrorContext::new().with_status_code(429),
            ))
            .unwrap();
        assert_eq!(delay, Duration::from_millis(100));
    }

    #[test]
    fn test_wait_past_deadline_surfaces_timeout() {
        let p = RetryPolicy {
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(5),
            ..policy(3)
        };
        let req = ExchangeRequest::get("/v1/usage");
        let mut state = RetryState::new(&p, &req, Some(Duration::from_secs(1)));
        let budget = state.begin_attempt(Duration::from_secs(30)).unwrap();
        assert!(budget <= Duration::from_secs(1));

        let err = state.on_failure(server_error(503)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.status_code(), Some(503));
        assert!(err.context().details.as_deref().unwrap().contains("last error"));
    }

    #[test]
    fn test_huge_retry_after_with_deadline_does_not_overflow() {
        let p = policy(3);
        let req = ExchangeRequest::get("/v1/usage");
        let mut state = RetryState::new(&p, &req, Some(Duration::from_secs(60)));
        state.begin_attempt(Duration::from_secs(1)).unwrap();
        let err = state
            .on_failure(Error::rate_limit_with_context(
                "later",
                Some(Duration::from_secs(u64::MAX / 2)),
                ErrorContext::new().with_status_code(429),
            ))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.status_code(), Some(429));
    }

    #[test]
    fn test_expired_deadline_blocks_new_attempts() {
        let p = policy(3);
        let req = ExchangeRequest::get("/v1/usage");
        let mut state = RetryState::new(&p, &req, Some(Duration::ZERO));
        let err = state.begin_attempt(Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(state.attempt(), 0);
    }
}
