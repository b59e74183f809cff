//! Embedding data shapes, model catalog and vector math.
//!
//! This module provides:
//! - The static model catalog used for local model validation
//! - Request/response records for the vectorize and usage endpoints
//! - Vector operations (magnitude, normalization, cosine similarity)

mod models;
mod types;
mod vectors;

pub use models::{
    available_model_ids, find_model, EmbeddingModel, ModelInfo, CATALOG_VERSION, MODELS,
};
pub use types::{
    BatchVectorizeRequest, BatchVectorizeResponse, UsageInfo, VectorizeRequest,
    VectorizeResponse,
};
pub(crate) use types::{WireBatchResponse, WireVectorizeResponse};
pub use vectors::{cosine_similarity, dot_product, magnitude, normalize_vector, Vector};
