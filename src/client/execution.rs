//! 请求执行：阻塞与异步两个适配器共享同一重试状态机。
//!
//! Request execution (retry loop).
//!
//! [`run_blocking`] and [`run_async`] are thin adapters over [`RetryState`]:
//! classification, retry decisions and deadlines live there, the adapters only
//! perform the exchange and the wait.

use super::builder::ClientConfig;
use super::error_classification::settle;
use super::policy::RetryState;
use super::types::CallOptions;
use crate::transport::{AsyncExchange, Exchange, ExchangeRequest, RawResponse, TransportError};
use crate::Result;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Granularity at which a blocking backoff wait observes cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Executes one logical call on the calling thread.
///
/// Cancellation is observed before each attempt and during backoff waits; an
/// attempt already in flight runs until its own time budget.
pub(crate) fn run_blocking(
    exchange: &dyn Exchange,
    config: &ClientConfig,
    request: &ExchangeRequest,
    options: &CallOptions,
) -> Result<RawResponse> {
    let total_timeout = options.timeout.or(config.total_timeout);
    let mut state = RetryState::new(&config.retry, request, total_timeout);
    let cancel = options.cancel.as_ref();
    loop {
        if cancel.map_or(false, |t| t.is_cancelled()) {
            return Err(state.cancelled());
        }
        let budget = state.begin_attempt(config.timeout)?;
        match settle(request, exchange.exchange(request, budget)) {
            Ok(response) => {
                state.on_success(response.status);
                return Ok(response);
            }
            Err(err) => {
                let delay = state.on_failure(err)?;
                if !sleep_unless_cancelled(delay, cancel) {
                    return Err(state.cancelled());
                }
            }
        }
    }
}

/// Sleeps for `delay`, returning `false` as soon as `cancel` fires.
fn sleep_unless_cancelled(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    let Some(token) = cancel else {
        std::thread::sleep(delay);
        return true;
    };
    let wake = Instant::now().checked_add(delay);
    loop {
        if token.is_cancelled() {
            return false;
        }
        let left = match wake {
            Some(wake) => wake.saturating_duration_since(Instant::now()),
            None => CANCEL_POLL,
        };
        if left.is_zero() {
            return true;
        }
        std::thread::sleep(left.min(CANCEL_POLL));
    }
}

/// Executes one logical call, suspending at the exchange and at backoff waits.
pub(crate) async fn run_async(
    exchange: &dyn AsyncExchange,
    config: &ClientConfig,
    request: &ExchangeRequest,
    options: &CallOptions,
) -> Result<RawResponse> {
    let total_timeout = options.timeout.or(config.total_timeout);
    let mut state = RetryState::new(&config.retry, request, total_timeout);
    loop {
        if options.cancel.as_ref().map_or(false, |t| t.is_cancelled()) {
            return Err(state.cancelled());
        }
        let budget = state.begin_attempt(config.timeout)?;
        let attempt = async {
            tokio::time::timeout(budget, exchange.exchange(request, budget))
                .await
                .unwrap_or_else(|_| {
                    Err(TransportError::Timeout(format!(
                        "no response within {} ms",
                        budget.as_millis()
                    )))
                })
        };
        let outcome = match &options.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(state.cancelled()),
                outcome = attempt => outcome,
            },
            None => attempt.await,
        };

        match settle(request, outcome) {
            Ok(response) => {
                state.on_success(response.status);
                return Ok(response);
            }
            Err(err) => {
                let delay = state.on_failure(err)?;
                match &options.cancel {
                    Some(token) => tokio::select! {
                        biased;
                        _ = token.cancelled() => return Err(state.cancelled()),
                        _ = tokio::time::sleep(delay) => {}
                    },
                    None => tokio::time::sleep(delay).await,
                }
            }
        }
    }
}
