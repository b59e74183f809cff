//! 阻塞客户端：与异步客户端共享同一重试策略与错误分类。
//!
//! Blocking client.
//!
//! Each call occupies the calling thread until it completes, including backoff
//! waits. Behavior (validation, retries, classification, deadlines) is the same
//! as [`crate::VectorClient`]; only the way the thread is occupied differs.
//!
//! Do not use this client from inside a tokio runtime.

use crate::client::builder::{ClientConfig, VectorClientBuilder};
use crate::client::endpoint;
use crate::client::execution::run_blocking;
use crate::client::validation::validate_options;
use crate::client::CallOptions;
use crate::embeddings::{
    BatchVectorizeRequest, BatchVectorizeResponse, EmbeddingModel, ModelInfo, UsageInfo,
    VectorizeRequest, VectorizeResponse, MODELS,
};
use crate::transport::{Exchange, ExchangeRequest, RawResponse};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Blocking Hashub Vector client. Owns one HTTP session.
pub struct VectorClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Exchange>,
}

impl VectorClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        VectorClientBuilder::new().api_key(api_key).build_blocking()
    }

    pub fn builder() -> VectorClientBuilder {
        VectorClientBuilder::new()
    }

    pub(crate) fn from_parts(config: ClientConfig, transport: Arc<dyn Exchange>) -> Self {
        info!(
            base_url = %config.base_url,
            max_attempts = config.retry.max_attempts,
            "hashub vector blocking session opened"
        );
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn list_models(&self) -> &'static [ModelInfo] {
        MODELS
    }

    pub fn vectorize(
        &self,
        text: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<VectorizeResponse> {
        self.vectorize_request(&VectorizeRequest::new(text, model), &CallOptions::default())
    }

    /// `options.cancel` is checked before each attempt and during backoff waits.
    pub fn vectorize_request(
        &self,
        request: &VectorizeRequest,
        options: &CallOptions,
    ) -> Result<VectorizeResponse> {
        let call = endpoint::prepare_vectorize(request)?;
        let raw = self.execute(&call, options)?;
        endpoint::finish_vectorize(&call, raw)
    }

    pub fn vectorize_batch<I, S>(
        &self,
        texts: I,
        model: impl Into<String>,
    ) -> Result<BatchVectorizeResponse>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = BatchVectorizeRequest::new(texts, model);
        self.vectorize_batch_request(&request, &CallOptions::default())
    }

    pub fn vectorize_batch_request(
        &self,
        request: &BatchVectorizeRequest,
        options: &CallOptions,
    ) -> Result<BatchVectorizeResponse> {
        let call = endpoint::prepare_batch(request)?;
        let raw = self.execute(&call, options)?;
        endpoint::finish_batch(&call, raw, request.texts.len())
    }

    pub fn similarity(&self, text_a: &str, text_b: &str, model: impl Into<String>) -> Result<f32> {
        let model = model.into();
        let request = endpoint::similarity_request(text_a, text_b, &model);
        let batch = self.vectorize_batch_request(&request, &CallOptions::default())?;
        endpoint::similarity_of(&batch)
    }

    pub fn similarity_default(&self, text_a: &str, text_b: &str) -> Result<f32> {
        self.similarity(text_a, text_b, EmbeddingModel::default())
    }

    pub fn get_usage(&self) -> Result<UsageInfo> {
        self.get_usage_with(&CallOptions::default())
    }

    pub fn get_usage_with(&self, options: &CallOptions) -> Result<UsageInfo> {
        let call = endpoint::prepare_usage();
        let raw = self.execute(&call, options)?;
        endpoint::finish_usage(&call, raw)
    }

    pub fn execute(&self, request: &ExchangeRequest, options: &CallOptions) -> Result<RawResponse> {
        validate_options(options)?;
        run_blocking(self.transport.as_ref(), &self.config, request, options)
    }

    pub fn close(self) {
        drop(self);
    }
}

impl Drop for VectorClient {
    fn drop(&mut self) {
        info!(base_url = %self.config.base_url, "hashub vector blocking session closed");
    }
}

impl std::fmt::Debug for VectorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking::VectorClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
