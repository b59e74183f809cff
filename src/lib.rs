//! # hashub-vector
//!
//! Hashub Vector 文本向量化服务的 Rust 客户端，提供阻塞与异步两种调用方式。
//!
//! Rust client for the Hashub Vector text-embedding API, with a blocking and an
//! async call surface that share one retry and error-classification policy.
//!
//! ## Overview
//!
//! Embeddings are produced entirely server-side. The client validates inputs
//! locally, sends JSON over HTTPS with bearer authentication, retries transient
//! failures with exponential backoff, and maps every failure to exactly one
//! [`ErrorKind`].
//!
//! ## Key Features
//!
//! - **Async client**: [`VectorClient`] (tokio + reqwest)
//! - **Blocking client**: [`blocking::VectorClient`]
//! - **Local model catalog**: unknown models fail with `ModelNotFound` before any request
//! - **Bounded retries**: attempt ceiling, optional overall deadline, cancellation
//! - **Vector math**: cosine similarity, magnitude and normalization in [`embeddings`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hashub_vector::{EmbeddingModel, VectorClient};
//!
//! #[tokio::main]
//! async fn main() -> hashub_vector::Result<()> {
//!     let client = VectorClient::builder()
//!         .api_key("your-api-key")
//!         .max_attempts(3)
//!         .build()?;
//!
//!     let single = client.vectorize("Merhaba dünya", EmbeddingModel::GteBase).await?;
//!     println!("{} dims, {} tokens", single.dimension, single.token_count);
//!
//!     let batch = client
//!         .vectorize_batch(["first", "second"], "e5_small")
//!         .await?;
//!     assert_eq!(batch.len(), 2);
//!
//!     let score = client.similarity("cat", "kitten", "gte_base").await?;
//!     println!("similarity {score:.3}");
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Async client, builder, configuration and retry policy |
//! | [`blocking`] | Blocking client |
//! | [`embeddings`] | Model catalog, request/response records, vector operations |
//! | [`transport`] | Exchange capabilities and reqwest transports |
//! | [`error`] | Error type and context |
//! | [`error_code`] | Closed set of error kinds and their codes |

pub mod blocking;
pub mod client;
pub mod embeddings;
pub mod error;
pub mod error_code;
pub mod transport;

// Re-export main types for convenience
pub use client::{CallOptions, ClientConfig, RetryPolicy, VectorClient, VectorClientBuilder};
pub use embeddings::{
    BatchVectorizeRequest, BatchVectorizeResponse, EmbeddingModel, ModelInfo, UsageInfo,
    Vector, VectorizeRequest, VectorizeResponse,
};
pub use error::{Error, ErrorContext};
pub use error_code::ErrorKind;
pub use tokio_util::sync::CancellationToken;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
