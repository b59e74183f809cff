//! Smoke tests against the production API.
//!
//! Requires a real key. Run with:
//! HASHUB_API_KEY=... cargo test --test live_api -- --ignored --nocapture

use hashub_vector::{EmbeddingModel, VectorClient};

fn live_key() -> Option<String> {
    match std::env::var("HASHUB_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => {
            eprintln!("HASHUB_API_KEY not set, skipping live test");
            None
        }
    }
}

#[tokio::test]
#[ignore = "requires HASHUB_API_KEY and network access"]
async fn test_live_vectorize_and_similarity() {
    let Some(key) = live_key() else { return };
    let client = VectorClient::new(key).expect("client");

    for model in [EmbeddingModel::GteBase, EmbeddingModel::E5Small] {
        let resp = client.vectorize("Merhaba dünya", model).await.expect("vectorize");
        assert_eq!(resp.vector.len(), model.dimension());
    }

    let score = client
        .similarity("yapay zeka", "yapay zeka", "gte_base")
        .await
        .expect("similarity");
    assert!((score - 1.0).abs() < 1e-4);

    let usage = client.get_usage().await.expect("usage");
    println!("usage: {:?} ({:?}%)", usage, usage.tokens_percentage_used());
    client.close();
}

#[test]
#[ignore = "requires HASHUB_API_KEY and network access"]
fn test_live_blocking_batch() {
    let Some(key) = live_key() else { return };
    let client = hashub_vector::blocking::VectorClient::new(key).expect("client");

    let texts = ["first", "second", "third"];
    let batch = client.vectorize_batch(texts, "e5_small").expect("batch");
    assert_eq!(batch.len(), texts.len());
    assert_eq!(
        batch.total_tokens,
        batch.token_counts.iter().map(|&c| u64::from(c)).sum::<u64>()
    );
}
