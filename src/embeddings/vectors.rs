//! Vector math on embeddings.

use crate::{Error, ErrorContext, Result};

pub type Vector = Vec<f32>;

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::validation_with_context(
            format!("Vector dimensions must match: {} != {}", a.len(), b.len()),
            ErrorContext::new().with_source("vectors"),
        ));
    }
    Ok(())
}

pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Euclidean norm.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

pub fn normalize_vector(v: &[f32]) -> Vector {
    let mag = magnitude(v);
    if mag == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / mag).collect()
}

/// Cosine similarity; undefined (and rejected) when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_product(a, b)?;
    let mag_a = magnitude(a);
    let mag_b = magnitude(b);
    if mag_a == 0.0 || mag_b == 0.0 {
        return Err(Error::validation_with_context(
            "Cosine similarity is undefined for a zero-magnitude vector",
            ErrorContext::new()
                .with_field_path(if mag_a == 0.0 { "vector_a" } else { "vector_b" })
                .with_source("vectors"),
        ));
    }
    Ok((dot / (mag_a * mag_b)).clamp(-1.0, 1.0))
}
