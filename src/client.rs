//! Async client, its configuration and the shared call machinery.
//!
//! Keep the public surface small: [`VectorClient`], [`VectorClientBuilder`],
//! [`ClientConfig`], [`CallOptions`] and [`RetryPolicy`]. Retry, classification
//! and validation are split into submodules under `src/client/` and shared with
//! [`crate::blocking`].

pub mod builder;
pub mod core;
pub mod endpoint;
pub(crate) mod error_classification;
pub(crate) mod execution;
mod policy;
pub mod types;
pub(crate) mod validation;

pub use builder::{ClientConfig, VectorClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use core::VectorClient;
pub use policy::RetryPolicy;
pub use types::CallOptions;
