use super::builder::{ClientConfig, VectorClientBuilder};
use super::endpoint;
use super::execution::run_async;
use super::types::CallOptions;
use super::validation::validate_options;
use crate::embeddings::{
    BatchVectorizeRequest, BatchVectorizeResponse, EmbeddingModel, ModelInfo, UsageInfo,
    VectorizeRequest, VectorizeResponse, MODELS,
};
use crate::transport::{AsyncExchange, ExchangeRequest, RawResponse};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Async Hashub Vector client.
///
/// Owns one HTTP session, created at construction and released on
/// [`close`](Self::close) or drop. Safe to share across tasks; each call keeps
/// its retry state private.
///
/// ```no_run
/// # async fn run() -> hashub_vector::Result<()> {
/// let client = hashub_vector::VectorClient::new("hh_live_...")?;
/// let response = client.vectorize("Merhaba dünya", "gte_base").await?;
/// assert_eq!(response.vector.len(), response.dimension);
/// client.close();
/// # Ok(())
/// # }
/// ```
pub struct VectorClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn AsyncExchange>,
}

impl VectorClient {
    /// Client with default settings for the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        VectorClientBuilder::new().api_key(api_key).build()
    }

    pub fn builder() -> VectorClientBuilder {
        VectorClientBuilder::new()
    }

    pub(crate) fn from_parts(config: ClientConfig, transport: Arc<dyn AsyncExchange>) -> Self {
        info!(
            base_url = %config.base_url,
            max_attempts = config.retry.max_attempts,
            "hashub vector session opened"
        );
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Known models. No network call.
    pub fn list_models(&self) -> &'static [ModelInfo] {
        MODELS
    }

    /// Embeds one text.
    pub async fn vectorize(
        &self,
        text: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<VectorizeResponse> {
        self.vectorize_request(&VectorizeRequest::new(text, model), &CallOptions::default())
            .await
    }

    pub async fn vectorize_request(
        &self,
        request: &VectorizeRequest,
        options: &CallOptions,
    ) -> Result<VectorizeResponse> {
        let call = endpoint::prepare_vectorize(request)?;
        let raw = self.execute(&call, options).await?;
        endpoint::finish_vectorize(&call, raw)
    }

    /// Embeds several texts in one request. Output order follows input order.
    pub async fn vectorize_batch<I, S>(
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
            .await
    }

    pub async fn vectorize_batch_request(
        &self,
        request: &BatchVectorizeRequest,
        options: &CallOptions,
    ) -> Result<BatchVectorizeResponse> {
        let call = endpoint::prepare_batch(request)?;
        let raw = self.execute(&call, options).await?;
        endpoint::finish_batch(&call, raw, request.texts.len())
    }

    /// Cosine similarity of two texts, embedded with one batch call.
    pub async fn similarity(
        &self,
        text_a: &str,
        text_b: &str,
        model: impl Into<String>,
    ) -> Result<f32> {
        let model = model.into();
        let request = endpoint::similarity_request(text_a, text_b, &model);
        let batch = self
            .vectorize_batch_request(&request, &CallOptions::default())
            .await?;
        endpoint::similarity_of(&batch)
    }

    /// Same as [`similarity`](Self::similarity) with the default model.
    pub async fn similarity_default(&self, text_a: &str, text_b: &str) -> Result<f32> {
        self.similarity(text_a, text_b, EmbeddingModel::default())
            .await
    }

    pub async fn get_usage(&self) -> Result<UsageInfo> {
        self.get_usage_with(&CallOptions::default()).await
    }

    pub async fn get_usage_with(&self, options: &CallOptions) -> Result<UsageInfo> {
        let call = endpoint::prepare_usage();
        let raw = self.execute(&call, options).await?;
        endpoint::finish_usage(&call, raw)
    }

    /// Runs one logical call (all attempts) and returns the successful raw response.
    pub async fn execute(
        &self,
        request: &ExchangeRequest,
        options: &CallOptions,
    ) -> Result<RawResponse> {
        validate_options(options)?;
        run_async(self.transport.as_ref(), &self.config, request, options).await
    }

    /// Releases the session.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for VectorClient {
    fn drop(&mut self) {
        info!(base_url = %self.config.base_url, "hashub vector session closed");
    }
}

impl std::fmt::Debug for VectorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
