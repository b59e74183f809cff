//! Endpoint paths and the request/response shaping shared by both clients.

use super::error_classification::{decode_json, malformed};
use super::validation::{validate_batch, validate_vectorize};
use crate::embeddings::{
    cosine_similarity, BatchVectorizeRequest, BatchVectorizeResponse, UsageInfo,
    VectorizeRequest, VectorizeResponse, WireBatchResponse, WireVectorizeResponse,
};
use crate::transport::{ExchangeRequest, RawResponse};
use crate::{Error, ErrorContext, Result};

pub const VECTORIZE_PATH: &str = "/v1/vectorize";
pub const VECTORIZE_BATCH_PATH: &str = "/v1/vectorize/batch";
pub const USAGE_PATH: &str = "/v1/usage";

fn to_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| {
        Error::validation_with_context(
            format!("Request is not serializable: {}", e),
            ErrorContext::new().with_source("request_builder"),
        )
    })
}

pub(crate) fn prepare_vectorize(request: &VectorizeRequest) -> Result<ExchangeRequest> {
    validate_vectorize(request)?;
    Ok(ExchangeRequest::post(VECTORIZE_PATH, to_body(request)?))
}

pub(crate) fn finish_vectorize(
    call: &ExchangeRequest,
    response: RawResponse,
) -> Result<VectorizeResponse> {
    let wire: WireVectorizeResponse = decode_json(call, &response)?;
    let parsed = VectorizeResponse::from_wire(wire).map_err(|r| malformed(call, &response, r))?;
    if let Some(info) = call.model().and_then(crate::embeddings::find_model) {
        if info.dimension != parsed.dimension {
            return Err(malformed(
                call,
                &response,
                format!(
                    "model {} has dimension {}, response has {}",
                    info.id, info.dimension, parsed.dimension
                ),
            ));
        }
    }
    Ok(parsed)
}

pub(crate) fn prepare_batch(request: &BatchVectorizeRequest) -> Result<ExchangeRequest> {
    validate_batch(request)?;
    Ok(ExchangeRequest::post(VECTORIZE_BATCH_PATH, to_body(request)?))
}

pub(crate) fn finish_batch(
    call: &ExchangeRequest,
    response: RawResponse,
    expected: usize,
) -> Result<BatchVectorizeResponse> {
    let wire: WireBatchResponse = decode_json(call, &response)?;
    BatchVectorizeResponse::from_wire(wire, expected).map_err(|r| malformed(call, &response, r))
}

pub(crate) fn prepare_usage() -> ExchangeRequest {
    ExchangeRequest::get(USAGE_PATH)
}

pub(crate) fn finish_usage(call: &ExchangeRequest, response: RawResponse) -> Result<UsageInfo> {
    decode_json(call, &response)
}

pub(crate) fn similarity_request(
    text_a: &str,
    text_b: &str,
    model: &str,
) -> BatchVectorizeRequest {
    BatchVectorizeRequest::new([text_a, text_b], model)
}

/// Cosine similarity of the two vectors of a size-2 batch.
pub(crate) fn similarity_of(batch: &BatchVectorizeResponse) -> Result<f32> {
    match batch.vectors.as_slice() {
        [a, b] => cosine_similarity(a, b),
        other => Err(Error::server(format!(
            "Similarity needs 2 vectors, response has {}",
            other.len()
        ))),
    }
}
