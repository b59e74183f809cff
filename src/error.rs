use crate::error_code::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Structured error context for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// HTTP status of the response that produced the error, when there was one
    pub status_code: Option<u16>,
    /// Raw response body as received from the server
    pub response_body: Option<String>,
    /// Request field that caused the error (e.g., "text", "texts[2]", "model")
    pub field_path: Option<String>,
    /// Additional context about the error
    pub details: Option<String>,
    /// Component that raised the error (e.g., "validator", "transport")
    pub source: Option<String>,
    /// Client-generated request id, shared by all attempts of one call
    pub request_id: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        if !body.is_empty() {
            self.response_body = Some(body);
        }
        self
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

/// Unified error type of the Hashub Vector client.
///
/// Each variant is one [`ErrorKind`]; there is no catch-all variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {message}{}", format_context(.context))]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Rate limit error: {message}{}{}", format_retry_after(.retry_after), format_context(.context))]
    RateLimit {
        message: String,
        retry_after: Option<Duration>,
        context: ErrorContext,
    },

    #[error("Model not found: {message}{}", format_context(.context))]
    ModelNotFound {
        model: String,
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Quota exceeded: {message}{}", format_context(.context))]
    QuotaExceeded {
        message: String,
        context: ErrorContext,
    },

    #[error("Server error: {message}{}", format_context(.context))]
    Server {
        message: String,
        context: ErrorContext,
    },

    #[error("Timeout: {message}{}", format_context(.context))]
    Timeout {
        message: String,
        context: ErrorContext,
    },

    #[error("Network error: {message}{}", format_context(.context))]
    Network {
        message: String,
        context: ErrorContext,
    },
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {:.3}s)", d.as_secs_f64()),
        None => String::new(),
    }
}

// Body is left out of Display; it is available through `response_body()`.
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(status) = ctx.status_code {
        parts.push(format!("status: {}", status));
    }
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

pub(crate) const DEFAULT_AUTHENTICATION_MESSAGE: &str = "Invalid or missing API key";
pub(crate) const DEFAULT_RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";
pub(crate) const DEFAULT_QUOTA_MESSAGE: &str = "Account quota exceeded";
pub(crate) const DEFAULT_SERVER_MESSAGE: &str = "Internal server error";
pub(crate) const DEFAULT_TIMEOUT_MESSAGE: &str = "Request timed out";
pub(crate) const DEFAULT_NETWORK_MESSAGE: &str = "Network connection failed";

impl Error {
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::authentication_with_context(msg, ErrorContext::new())
    }

    pub fn authentication_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Authentication {
            message: msg.into(),
            context,
        }
    }

    pub fn rate_limit_with_context(
        msg: impl Into<String>,
        retry_after: Option<Duration>,
        context: ErrorContext,
    ) -> Self {
        Error::RateLimit {
            message: msg.into(),
            retry_after,
            context,
        }
    }

    /// Unknown model; the message lists the catalog.
    pub fn model_not_found(model: impl Into<String>) -> Self {
        Self::model_not_found_with_context(model, ErrorContext::new())
    }

    pub fn model_not_found_with_context(model: impl Into<String>, context: ErrorContext) -> Self {
        let model = model.into();
        let message = format!(
            "Model '{}' not found. Available models: {}",
            model,
            crate::embeddings::available_model_ids().join(", ")
        );
        Error::ModelNotFound {
            model,
            message,
            context,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn quota_exceeded_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::QuotaExceeded {
            message: msg.into(),
            context,
        }
    }

    pub fn server(msg: impl Into<String>) -> Self {
        Self::server_with_context(msg, ErrorContext::new())
    }

    pub fn server_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Server {
            message: msg.into(),
            context,
        }
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::timeout_with_context(msg, ErrorContext::new())
    }

    pub fn timeout_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Timeout {
            message: msg.into(),
            context,
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::network_with_context(msg, ErrorContext::new())
    }

    pub fn network_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Network {
            message: msg.into(),
            context,
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::RateLimit { .. } => ErrorKind::RateLimit,
            Error::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Error::Server { .. } => ErrorKind::Server,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Network { .. } => ErrorKind::Network,
        }
    }

    /// Human-readable message without context decoration.
    pub fn message(&self) -> &str {
        match self {
            Error::Authentication { message, .. }
            | Error::RateLimit { message, .. }
            | Error::ModelNotFound { message, .. }
            | Error::Validation { message, .. }
            | Error::QuotaExceeded { message, .. }
            | Error::Server { message, .. }
            | Error::Timeout { message, .. }
            | Error::Network { message, .. } => message,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Error::Authentication { context, .. }
            | Error::RateLimit { context, .. }
            | Error::ModelNotFound { context, .. }
            | Error::Validation { context, .. }
            | Error::QuotaExceeded { context, .. }
            | Error::Server { context, .. }
            | Error::Timeout { context, .. }
            | Error::Network { context, .. } => context,
        }
    }

    pub(crate) fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Error::Authentication { context, .. }
            | Error::RateLimit { context, .. }
            | Error::ModelNotFound { context, .. }
            | Error::Validation { context, .. }
            | Error::QuotaExceeded { context, .. }
            | Error::Server { context, .. }
            | Error::Timeout { context, .. }
            | Error::Network { context, .. } => context,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.context().status_code
    }

    pub fn response_body(&self) -> Option<&str> {
        self.context().response_body.as_deref()
    }

    /// Raw response body parsed as JSON, when it is JSON.
    pub fn response_json(&self) -> Option<serde_json::Value> {
        self.response_body()
            .and_then(|b| serde_json::from_str(b).ok())
    }

    /// Server-provided wait hint for rate-limit errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Whether the retry loop may try again after this error.
    ///
    /// Server errors are transient only when they come from a 5xx response;
    /// unclassified 4xx statuses and undecodable success bodies are final.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Server { context, .. } => {
                matches!(context.status_code, Some(s) if (500..=599).contains(&s))
            }
            other => other.kind().is_transient(),
        }
    }
}
