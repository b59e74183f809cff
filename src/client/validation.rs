//! 请求校验：在任何网络调用之前拒绝无效输入。
//!
//! Local request validation. Failures here cost no network attempt.

use super::types::CallOptions;
use crate::embeddings::{find_model, BatchVectorizeRequest, ModelInfo, VectorizeRequest};
use crate::{Error, ErrorContext, Result};

fn validate_text(text: &str, field: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::validation_with_context(
            "Text must be a non-empty string",
            ErrorContext::new()
                .with_field_path(field)
                .with_source("request_validator"),
        ));
    }
    Ok(())
}

/// Resolves a model id against the local catalog.
pub(crate) fn validate_model(model: &str) -> Result<&'static ModelInfo> {
    find_model(model).ok_or_else(|| {
        Error::model_not_found_with_context(
            model,
            ErrorContext::new()
                .with_field_path("model")
                .with_source("request_validator"),
        )
    })
}

pub(crate) fn validate_vectorize(request: &VectorizeRequest) -> Result<&'static ModelInfo> {
    validate_text(&request.text, "text")?;
    validate_model(&request.model)
}

pub(crate) fn validate_batch(request: &BatchVectorizeRequest) -> Result<&'static ModelInfo> {
    if request.texts.is_empty() {
        return Err(Error::validation_with_context(
            "Texts must contain at least one element",
            ErrorContext::new()
                .with_field_path("texts")
                .with_source("request_validator"),
        ));
    }
    for (i, text) in request.texts.iter().enumerate() {
        validate_text(text, &format!("texts[{}]", i))?;
    }
    validate_model(&request.model)
}

pub(crate) fn validate_options(options: &CallOptions) -> Result<()> {
    if options.timeout == Some(std::time::Duration::ZERO) {
        return Err(Error::validation_with_context(
            "Timeout must be greater than zero",
            ErrorContext::new()
                .with_field_path("timeout")
                .with_source("request_validator"),
        ));
    }
    Ok(())
}
