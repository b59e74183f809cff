//! Shared fixtures: scripted in-process exchanges and canned response bodies.

#![allow(dead_code)]

use async_trait::async_trait;
use hashub_vector::transport::{
    AsyncExchange, Exchange, ExchangeRequest, RawResponse, TransportError,
};
use hashub_vector::VectorClientBuilder;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

static TRACING: Once = Once::new();

/// Surfaces crate logs with `RUST_LOG=hashub_vector=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(RawResponse),
    Fail(TransportError),
    /// Responds after the given delay, or times out if the budget is shorter.
    Slow(Duration, RawResponse),
}

pub fn status(code: u16, body: serde_json::Value) -> Step {
    Step::Respond(RawResponse::new(code, body.to_string()))
}

/// An attempt as seen by the exchange.
#[derive(Debug, Clone)]
pub struct Observed {
    pub at: Instant,
    pub request: ExchangeRequest,
    pub budget: Duration,
}

/// Plays back `steps` in order, repeating the last one when exhausted.
/// Usable as both the blocking and the async capability.
pub struct Scripted {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    observed: Mutex<Vec<Observed>>,
}

impl Scripted {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
        })
    }

    pub fn attempts(&self) -> usize {
        self.observed.lock().unwrap().len()
    }

    pub fn observed(&self) -> Vec<Observed> {
        self.observed.lock().unwrap().clone()
    }

    /// Gaps between consecutive attempts.
    pub fn gaps(&self) -> Vec<Duration> {
        self.observed()
            .windows(2)
            .map(|w| w[1].at.duration_since(w[0].at))
            .collect()
    }

    fn next(&self, request: &ExchangeRequest, budget: Duration) -> Step {
        self.observed.lock().unwrap().push(Observed {
            at: Instant::now(),
            request: request.clone(),
            budget,
        });
        let mut last = self.last.lock().unwrap();
        match self.steps.lock().unwrap().pop_front() {
            Some(step) => {
                *last = Some(step.clone());
                step
            }
            None => last
                .clone()
                .expect("scripted exchange called with an empty script"),
        }
    }
}

impl Exchange for Scripted {
    fn exchange(
        &self,
        request: &ExchangeRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        match self.next(request, timeout) {
            Step::Respond(raw) => Ok(raw),
            Step::Fail(err) => Err(err),
            Step::Slow(delay, raw) => {
                if delay > timeout {
                    std::thread::sleep(timeout);
                    Err(TransportError::Timeout("scripted slow backend".into()))
                } else {
                    std::thread::sleep(delay);
                    Ok(raw)
                }
            }
        }
    }
}

#[async_trait]
impl AsyncExchange for Scripted {
    async fn exchange(
        &self,
        request: &ExchangeRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let step = self.next(request, timeout);
        match step {
            Step::Respond(raw) => Ok(raw),
            Step::Fail(err) => Err(err),
            // The caller enforces the budget.
            Step::Slow(delay, raw) => {
                tokio::time::sleep(delay).await;
                Ok(raw)
            }
        }
    }
}

/// Builder pointed at a dummy endpoint with fast, deterministic retries.
pub fn builder() -> VectorClientBuilder {
    VectorClientBuilder::new()
        .api_key("hh_test_key")
        .base_url("https://vector.test")
        .timeout(Duration::from_secs(5))
        .max_attempts(3)
        .base_delay(Duration::from_millis(20))
        .max_delay(Duration::from_millis(200))
        .jitter(false)
}

/// Deterministic unit-ish vector of the given dimension.
pub fn fake_vector(dimension: usize, seed: usize) -> Vec<f32> {
    (0..dimension)
        .map(|i| (((i + seed) % 7) as f32 + 1.0) / 10.0)
        .collect()
}

pub fn vectorize_body(model: &str, dimension: usize) -> serde_json::Value {
    json!({
        "model": model,
        "dimension": dimension,
        "vector": fake_vector(dimension, 0),
        "token_count": 4,
        "processing_time_ms": 12.5
    })
}

pub fn batch_body(model: &str, dimension: usize, texts: &[&str]) -> serde_json::Value {
    let vectors: Vec<Vec<f32>> = (0..texts.len()).map(|i| fake_vector(dimension, i)).collect();
    let token_counts: Vec<u32> = texts
        .iter()
        .map(|t| t.split_whitespace().count() as u32 + 1)
        .collect();
    json!({
        "model": model,
        "vectors": vectors,
        "token_counts": token_counts,
        "processing_time_ms": 30.0
    })
}

/// Batch body whose two vectors are identical.
pub fn twin_batch_body(model: &str, dimension: usize) -> serde_json::Value {
    let v = fake_vector(dimension, 3);
    json!({
        "model": model,
        "vectors": [v.clone(), v],
        "token_counts": [2, 2]
    })
}

pub fn usage_body() -> serde_json::Value {
    json!({"tokens_used": 2500, "tokens_remaining": 7500, "requests_used": 42})
}
