use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Overall deadline for the call, covering every attempt and backoff wait.
    /// Overrides the client's `total_timeout`.
    pub timeout: Option<Duration>,
    /// Aborts the call when cancelled, surfacing a `Timeout` error. The async
    /// client also aborts an attempt in flight; the blocking client stops before
    /// the next attempt or during a backoff wait.
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}
