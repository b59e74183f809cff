//! 错误类别：八种错误类型及其重试语义。
//!
//! Error kinds of the Hashub Vector client.
//!
//! Every failure surfaced by this crate belongs to exactly one [`ErrorKind`].
//! Each kind carries a stable code, a snake_case name and a category, so
//! applications can branch or aggregate without string-matching messages.
//!
//! | Prefix | Category | Kinds |
//! |--------|----------|-------|
//! | E1xxx  | client   | validation, authentication, model_not_found |
//! | E2xxx  | rate     | rate_limit, quota_exceeded |
//! | E3xxx  | server   | server, timeout |
//! | E5xxx  | network  | network |
//!
//! ## Example
//!
//! ```rust
//! use hashub_vector::error_code::ErrorKind;
//!
//! let kind = ErrorKind::from_http_status(429);
//! assert_eq!(kind, ErrorKind::RateLimit);
//! assert_eq!(kind.code(), "E2001");
//! assert!(kind.is_transient());
//! ```

use std::fmt;

/// Closed set of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// E1001: Request parameters are invalid (locally or per the server)
    Validation,
    /// E1002: Invalid, expired, or missing API key
    Authentication,
    /// E1004: Requested model does not exist
    ModelNotFound,
    /// E2001: Request rate limit exceeded
    RateLimit,
    /// E2002: Account quota exhausted
    QuotaExceeded,
    /// E3001: Server-side failure or unclassified response
    Server,
    /// E3003: Request or overall call timed out (including cancellation)
    Timeout,
    /// E5001: Connection could not be established or was dropped
    Network,
}

impl ErrorKind {
    /// All kinds, in code order.
    pub const ALL: [ErrorKind; 8] = [
        Self::Validation,
        Self::Authentication,
        Self::ModelNotFound,
        Self::RateLimit,
        Self::QuotaExceeded,
        Self::Server,
        Self::Timeout,
        Self::Network,
    ];

    /// Returns the stable code string (e.g. `"E1002"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "E1001",
            Self::Authentication => "E1002",
            Self::ModelNotFound => "E1004",
            Self::RateLimit => "E2001",
            Self::QuotaExceeded => "E2002",
            Self::Server => "E3001",
            Self::Timeout => "E3003",
            Self::Network => "E5001",
        }
    }

    /// Returns the snake_case name (e.g. `"rate_limit"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::ModelNotFound => "model_not_found",
            Self::RateLimit => "rate_limit",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Server => "server",
            Self::Timeout => "timeout",
            Self::Network => "network",
        }
    }

    /// Returns the category: `"client"`, `"rate"`, `"server"` or `"network"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation | Self::Authentication | Self::ModelNotFound => "client",
            Self::RateLimit | Self::QuotaExceeded => "rate",
            Self::Server | Self::Timeout => "server",
            Self::Network => "network",
        }
    }

    /// Whether failures of this kind are expected to resolve on their own.
    ///
    /// This is the kind-level default. A `Server` error raised for an
    /// unclassified 4xx status is still not retried; see
    /// [`crate::Error::is_transient`].
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Server | Self::Timeout | Self::Network
        )
    }

    /// Maps a non-2xx HTTP status to its kind.
    ///
    /// 404 maps to `ModelNotFound` here; callers that know the request did not
    /// name a model downgrade it to `Server`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 | 413 | 422 => Self::Validation,
            401 | 403 => Self::Authentication,
            402 => Self::QuotaExceeded,
            404 => Self::ModelNotFound,
            408 => Self::Timeout,
            429 => Self::RateLimit,
            _ => Self::Server,
        }
    }

    /// Looks a kind up by its code string.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}
