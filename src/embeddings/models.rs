//! Static catalog of the embedding models served by the API.
//!
//! Model validation is local: an id not in [`MODELS`] is rejected before any
//! request is sent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Catalog entry for one embedding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub dimension: usize,
    pub max_tokens: usize,
    pub description: &'static str,
}

/// Known embedding models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingModel {
    GteBase,
    NomicBase,
    E5Base,
    MpnetBase,
    E5Small,
    MinilmBase,
}

/// Catalog version; bump when entries change.
pub const CATALOG_VERSION: &str = "2025.1";

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gte_base",
        name: "GTE Multilingual Base",
        dimension: 768,
        max_tokens: 8192,
        description: "Long-context multilingual model, best overall quality (recommended for Turkish)",
    },
    ModelInfo {
        id: "nomic_base",
        name: "Nomic Embed Text",
        dimension: 768,
        max_tokens: 2048,
        description: "General purpose model with a medium context window",
    },
    ModelInfo {
        id: "e5_base",
        name: "Multilingual E5 Base",
        dimension: 768,
        max_tokens: 512,
        description: "Balanced multilingual retrieval model",
    },
    ModelInfo {
        id: "mpnet_base",
        name: "Paraphrase Multilingual MPNet Base",
        dimension: 768,
        max_tokens: 512,
        description: "Sentence similarity and paraphrase detection",
    },
    ModelInfo {
        id: "e5_small",
        name: "Multilingual E5 Small",
        dimension: 384,
        max_tokens: 512,
        description: "Fast, low-cost multilingual model",
    },
    ModelInfo {
        id: "minilm_base",
        name: "Paraphrase Multilingual MiniLM",
        dimension: 384,
        max_tokens: 512,
        description: "Smallest and fastest model",
    },
];

impl EmbeddingModel {
    pub const ALL: [EmbeddingModel; 6] = [
        Self::GteBase,
        Self::NomicBase,
        Self::E5Base,
        Self::MpnetBase,
        Self::E5Small,
        Self::MinilmBase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GteBase => "gte_base",
            Self::NomicBase => "nomic_base",
            Self::E5Base => "e5_base",
            Self::MpnetBase => "mpnet_base",
            Self::E5Small => "e5_small",
            Self::MinilmBase => "minilm_base",
        }
    }

    pub fn info(&self) -> &'static ModelInfo {
        // ALL and MODELS are declared in the same order.
        &MODELS[*self as usize]
    }

    pub fn dimension(&self) -> usize {
        self.info().dimension
    }
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        Self::GteBase
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == id)
            .ok_or_else(|| Error::model_not_found(id))
    }
}

impl From<EmbeddingModel> for String {
    fn from(m: EmbeddingModel) -> Self {
        m.as_str().to_string()
    }
}

/// Looks up a model id in the catalog.
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

pub fn available_model_ids() -> Vec<&'static str> {
    MODELS.iter().map(|m| m.id).collect()
}
