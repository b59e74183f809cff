//! Error classification logic
//!
//! Total mapping from exchange outcomes to [`Error`]: every status code and
//! every local failure yields exactly one kind, keeping the status and raw
//! body for diagnostics.

use crate::error::{
    DEFAULT_AUTHENTICATION_MESSAGE, DEFAULT_NETWORK_MESSAGE, DEFAULT_QUOTA_MESSAGE,
    DEFAULT_RATE_LIMIT_MESSAGE, DEFAULT_SERVER_MESSAGE, DEFAULT_TIMEOUT_MESSAGE,
};
use crate::error_code::ErrorKind;
use crate::transport::{
    parse_retry_after, retry_after_secs, ExchangeRequest, RawResponse, TransportError,
};
use crate::{Error, ErrorContext, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Turns one exchange outcome into the success response or a classified error.
pub(crate) fn settle(
    request: &ExchangeRequest,
    outcome: std::result::Result<RawResponse, TransportError>,
) -> Result<RawResponse> {
    match outcome {
        Ok(response) if response.is_success() => Ok(response),
        Ok(response) => Err(classify_response(request, &response)),
        Err(e) => Err(classify_transport_error(e)),
    }
}

/// Classifies a non-2xx response.
pub(crate) fn classify_response(request: &ExchangeRequest, response: &RawResponse) -> Error {
    let status = response.status;
    let server_message = error_message(&response.body);
    let context = ErrorContext::new()
        .with_status_code(status)
        .with_response_body(response.body.clone())
        .with_source("http");
    let message_or = |default: &str| server_message.clone().unwrap_or_else(|| default.to_string());

    match ErrorKind::from_http_status(status) {
        ErrorKind::Authentication => {
            Error::authentication_with_context(message_or(DEFAULT_AUTHENTICATION_MESSAGE), context)
        }
        ErrorKind::QuotaExceeded => {
            Error::quota_exceeded_with_context(message_or(DEFAULT_QUOTA_MESSAGE), context)
        }
        ErrorKind::RateLimit => {
            let retry_after = response.retry_after.or_else(|| body_retry_after(&response.body));
            Error::rate_limit_with_context(message_or(DEFAULT_RATE_LIMIT_MESSAGE), retry_after, context)
        }
        ErrorKind::Validation => Error::validation_with_context(
            message_or(&format!("Request rejected with HTTP {}", status)),
            context,
        ),
        ErrorKind::Timeout => {
            Error::timeout_with_context(message_or(DEFAULT_TIMEOUT_MESSAGE), context)
        }
        ErrorKind::ModelNotFound => match request.model() {
            Some(model) => {
                let context = match &server_message {
                    Some(m) => context.with_details(m.clone()),
                    None => context,
                };
                Error::model_not_found_with_context(model, context)
            }
            None => Error::server_with_context(
                message_or(&format!("Resource not found: {}", request.path)),
                context,
            ),
        },
        ErrorKind::Server | ErrorKind::Network => {
            let default = if (500..=599).contains(&status) {
                DEFAULT_SERVER_MESSAGE.to_string()
            } else {
                format!("Unexpected HTTP status {}", status)
            };
            Error::server_with_context(server_message.clone().unwrap_or(default), context)
        }
    }
}

/// Classifies a failure that produced no HTTP response.
pub(crate) fn classify_transport_error(err: TransportError) -> Error {
    let context = ErrorContext::new().with_source("transport");
    match err {
        TransportError::Timeout(detail) => {
            Error::timeout_with_context(DEFAULT_TIMEOUT_MESSAGE, context.with_details(detail))
        }
        TransportError::Connect(detail) | TransportError::Other(detail) => {
            Error::network_with_context(DEFAULT_NETWORK_MESSAGE, context.with_details(detail))
        }
    }
}

/// Decodes a 2xx body; undecodable JSON is a server error carrying the raw body.
pub(crate) fn decode_json<T: DeserializeOwned>(
    request: &ExchangeRequest,
    response: &RawResponse,
) -> Result<T> {
    serde_json::from_str(&response.body)
        .map_err(|e| malformed(request, response, format!("undecodable response body: {}", e)))
}

/// Server error for a 2xx response whose content violates the expected shape.
pub(crate) fn malformed(
    request: &ExchangeRequest,
    response: &RawResponse,
    reason: impl Into<String>,
) -> Error {
    Error::server_with_context(
        format!("Malformed response from {}: {}", request.path, reason.into()),
        ErrorContext::new()
            .with_status_code(response.status)
            .with_response_body(response.body.clone())
            .with_request_id(request.request_id.clone())
            .with_source("decoder"),
    )
}

/// Extracts a human-readable message from common error body shapes.
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(detail) = json.get("detail") {
        if let Some(s) = detail.as_str() {
            return Some(s.to_string());
        }
        // Validation detail lists: [{"loc": [...], "msg": "..."}]
        if let Some(items) = detail.as_array() {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
    }

    match json.get("error") {
        Some(serde_json::Value::String(s)) => return Some(s.clone()),
        Some(e) => {
            if let Some(m) = e.get("message").and_then(|m| m.as_str()) {
                return Some(m.to_string());
            }
        }
        None => {}
    }

    json.get("message")
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

fn body_retry_after(body: &str) -> Option<Duration> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let v = json
        .get("retry_after")
        .or_else(|| json.get("error").and_then(|e| e.get("retry_after")))?;
    match v {
        serde_json::Value::Number(n) => n.as_f64().and_then(retry_after_secs),
        serde_json::Value::String(s) => parse_retry_after(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vectorize_request() -> ExchangeRequest {
        ExchangeRequest::post("/v1/vectorize", json!({"text": "hi", "model": "e5_base"}))
    }

    fn classify(status: u16, body: &str) -> Error {
        classify_response(&vectorize_request(), &RawResponse::new(status, body))
    }

    #[test]
    fn test_documented_status_mapping() {
        let cases = [
            (400, ErrorKind::Validation),
            (401, ErrorKind::Authentication),
            (402, ErrorKind::QuotaExceeded),
            (404, ErrorKind::ModelNotFound),
            (408, ErrorKind::Timeout),
            (429, ErrorKind::RateLimit),
            (500, ErrorKind::Server),
            (503, ErrorKind::Server),
        ];
        for (status, kind) in cases {
            let err = classify(status, "");
            assert_eq!(err.kind(), kind, "status {}", status);
            assert_eq!(err.status_code(), Some(status));
        }
    }

    #[test]
    fn test_every_non_success_status_is_classified_with_status_kept() {
        for status in (100u16..200).chain(300..600) {
            let err = classify(status, "raw");
            assert_eq!(err.status_code(), Some(status));
            assert_eq!(err.response_body(), Some("raw"));
        }
    }

    #[test]
    fn test_unclassified_4xx_is_final_server_error() {
        let err = classify(409, r#"{"detail":"conflict"}"#);
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "conflict");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_404_without_model_is_server_error() {
        let err = classify_response(&ExchangeRequest::get("/v1/usage"), &RawResponse::new(404, ""));
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(!err.is_transient());
        assert!(err.message().contains("/v1/usage"));
    }

    #[test]
    fn test_404_with_model_names_it() {
        let err = classify(404, r#"{"detail":"Model e5_base is unavailable"}"#);
        match &err {
            Error::ModelNotFound { model, context, .. } => {
                assert_eq!(model, "e5_base");
                assert_eq!(context.details.as_deref(), Some("Model e5_base is unavailable"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_message_extraction_shapes() {
        assert_eq!(classify(400, r#"{"detail":"text too long"}"#).message(), "text too long");
        assert_eq!(
            classify(422, r#"{"detail":[{"loc":["body","text"],"msg":"field required"}]}"#).message(),
            "field required"
        );
        assert_eq!(classify(500, r#"{"error":{"message":"db down"}}"#).message(), "db down");
        assert_eq!(classify(500, r#"{"error":"oops"}"#).message(), "oops");
        assert_eq!(classify(500, r#"{"message":"hi"}"#).message(), "hi");
        assert_eq!(classify(500, "<html>").message(), DEFAULT_SERVER_MESSAGE);
        assert_eq!(classify(401, "").message(), DEFAULT_AUTHENTICATION_MESSAGE);
    }

    #[test]
    fn test_rate_limit_hint_from_header_then_body() {
        let header = RawResponse::new(429, r#"{"retry_after": 9}"#)
            .with_retry_after(Duration::from_secs(2));
        let err = classify_response(&vectorize_request(), &header);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));

        let err = classify(429, r#"{"detail":"slow down","retry_after": 1.5}"#);
        assert_eq!(err.retry_after(), Some(Duration::from_millis(1_500)));
        assert_eq!(err.message(), "slow down");

        assert_eq!(classify(429, "").retry_after(), None);
    }

    #[test]
    fn test_oversized_retry_after_is_dropped() {
        let err = classify(429, r#"{"detail":"later","retry_after": 1e20}"#);
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.retry_after(), None);

        let err = classify(429, r#"{"retry_after": -3}"#);
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_transport_errors() {
        let t = classify_transport_error(TransportError::Timeout("30s".into()));
        assert_eq!(t.kind(), ErrorKind::Timeout);
        assert_eq!(t.status_code(), None);
        let n = classify_transport_error(TransportError::Connect("refused".into()));
        assert_eq!(n.kind(), ErrorKind::Network);
        assert_eq!(n.context().details.as_deref(), Some("refused"));
        let o = classify_transport_error(TransportError::Other("dns".into()));
        assert_eq!(o.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_settle_passes_success_through() {
        let ok = settle(&vectorize_request(), Ok(RawResponse::new(200, "{}"))).unwrap();
        assert_eq!(ok.status, 200);
    }

    #[test]
    fn test_decode_json_failure_is_server_error() {
        let req = vectorize_request();
        let resp = RawResponse::new(200, "not json");
        let err = decode_json::<serde_json::Value>(&req, &resp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status_code(), Some(200));
        assert_eq!(err.response_body(), Some("not json"));
        assert!(!err.is_transient());
    }
}
