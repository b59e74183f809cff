//! Request and response records for the vectorize and usage endpoints.

use serde::{Deserialize, Serialize};

use super::vectors::{magnitude, normalize_vector, Vector};

/// Request for a single embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorizeRequest {
    pub text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
}

impl VectorizeRequest {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            normalize: None,
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = Some(normalize);
        self
    }
}

/// Request for embeddings of several texts; output order follows `texts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchVectorizeRequest {
    pub texts: Vec<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
}

impl BatchVectorizeRequest {
    pub fn new<I, S>(texts: I, model: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            model: model.into(),
            normalize: None,
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = Some(normalize);
        self
    }
}

/// A single embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorizeResponse {
    pub model: String,
    pub dimension: usize,
    pub vector: Vector,
    pub token_count: u32,
    pub processing_time_ms: Option<f64>,
    /// Euclidean norm, computed locally from `vector`.
    pub magnitude: f32,
}

impl VectorizeResponse {
    /// Unit-length copy of the vector.
    pub fn normalized(&self) -> Vector {
        normalize_vector(&self.vector)
    }

    pub(crate) fn from_wire(wire: WireVectorizeResponse) -> Result<Self, String> {
        let dimension = wire.dimension.unwrap_or(wire.vector.len());
        if dimension == 0 {
            return Err("response vector is empty".to_string());
        }
        if wire.vector.len() != dimension {
            return Err(format!(
                "response vector has {} values but declares dimension {}",
                wire.vector.len(),
                dimension
            ));
        }
        let magnitude = magnitude(&wire.vector);
        Ok(Self {
            model: wire.model,
            dimension,
            vector: wire.vector,
            token_count: wire.token_count,
            processing_time_ms: wire.processing_time_ms,
            magnitude,
        })
    }
}

/// Embeddings for a batch; `vectors[i]` belongs to input `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchVectorizeResponse {
    pub model: String,
    pub vectors: Vec<Vector>,
    pub token_counts: Vec<u32>,
    pub total_tokens: u64,
    pub count: usize,
    pub processing_time_ms: Option<f64>,
}

impl BatchVectorizeResponse {
    pub fn dimension(&self) -> usize {
        self.vectors.first().map(|v| v.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn magnitudes(&self) -> Vec<f32> {
        self.vectors.iter().map(|v| magnitude(v)).collect()
    }

    /// Builds the response, checking it lines up with `expected` inputs.
    pub(crate) fn from_wire(wire: WireBatchResponse, expected: usize) -> Result<Self, String> {
        if wire.vectors.len() != expected {
            return Err(format!(
                "batch response has {} vectors for {} inputs",
                wire.vectors.len(),
                expected
            ));
        }
        if wire.token_counts.len() != expected {
            return Err(format!(
                "batch response has {} token counts for {} inputs",
                wire.token_counts.len(),
                expected
            ));
        }
        let dimension = wire.vectors.first().map(|v| v.len()).unwrap_or(0);
        if dimension == 0 {
            return Err("batch response contains an empty vector".to_string());
        }
        if let Some(i) = wire.vectors.iter().position(|v| v.len() != dimension) {
            return Err(format!(
                "batch vector {} has {} values, expected {}",
                i,
                wire.vectors[i].len(),
                dimension
            ));
        }

        let total_tokens: u64 = wire.token_counts.iter().map(|&c| u64::from(c)).sum();
        if let Some(reported) = wire.total_tokens {
            if reported != total_tokens {
                tracing::debug!(
                    reported,
                    derived = total_tokens,
                    "server total_tokens differs from sum of token_counts"
                );
            }
        }

        Ok(Self {
            model: wire.model,
            count: wire.vectors.len(),
            vectors: wire.vectors,
            token_counts: wire.token_counts,
            total_tokens,
            processing_time_ms: wire.processing_time_ms,
        })
    }
}

/// Account usage and quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub tokens_used: u64,
    #[serde(default)]
    pub tokens_remaining: Option<u64>,
    #[serde(default)]
    pub requests_used: Option<u64>,
}

impl UsageInfo {
    /// `tokens_used / (tokens_used + tokens_remaining) * 100`, when the remainder is known.
    pub fn tokens_percentage_used(&self) -> Option<f64> {
        let remaining = self.tokens_remaining?;
        let total = self.tokens_used.saturating_add(remaining);
        if total == 0 {
            return Some(0.0);
        }
        Some(self.tokens_used as f64 / total as f64 * 100.0)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireVectorizeResponse {
    pub model: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub token_count: u32,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBatchResponse {
    pub model: String,
    pub vectors: Vec<Vec<f32>>,
    #[serde(default)]
    pub token_counts: Vec<u32>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
}
