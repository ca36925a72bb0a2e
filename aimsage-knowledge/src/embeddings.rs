use std::time::Duration;

use serde::Deserialize;

use aimsage_core::KnowledgeSettings;

use crate::chunker::chunk_text;
use crate::errors::{KnowledgeError, KnowledgeResult};

/// Anything that can turn text into a fixed-dimension vector.
///
/// The production implementation is [`EmbeddingClient`]; tests inject
/// deterministic fakes.
#[allow(async_fn_in_trait)]
pub trait Embedder {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>>;
}

/// HTTP client for an Ollama-compatible embedding endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl EmbeddingClient {
    pub fn new(settings: &KnowledgeSettings) -> Self {
        Self {
            base_url: settings.embedding_url.trim_end_matches('/').to_string(),
            model: settings.embedding_model.clone(),
            client: reqwest::Client::new(),
        }
    }
}

impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::Embedding(format!(
                "embedding request failed: {status} {text}"
            )));
        }

        let payload: EmbedResponse = response.json().await?;

        if let Some(mut embeddings) = payload.embeddings
            && !embeddings.is_empty()
        {
            return Ok(embeddings.remove(0));
        }

        if let Some(embedding) = payload.embedding {
            return Ok(embedding);
        }

        Err(KnowledgeError::Embedding(
            "embedding response missing vectors".to_string(),
        ))
    }
}

#[derive(Debug, Clone, serde::Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embeddings: Option<Vec<Vec<f32>>>,
    embedding: Option<Vec<f32>>,
}

/// Embed a document of arbitrary length into a single vector.
///
/// Texts that fit in one chunk return the model output directly. Longer texts
/// are chunked, embedded sequentially with `chunk_delay_ms` pauses between
/// requests (upstream rate limits — latency is linear in chunk count), and
/// aggregated by per-dimension arithmetic mean. Any chunk failure propagates;
/// there is no partial-result recovery.
pub async fn embed_document<E: Embedder>(
    embedder: &E,
    settings: &KnowledgeSettings,
    text: &str,
) -> KnowledgeResult<Vec<f32>> {
    let chunks = chunk_text(text, settings.chunk_max_bytes, settings.chunk_overlap_bytes);

    if chunks.len() == 1 {
        let embedding = embedder.embed(&chunks[0]).await?;
        check_dim(settings.embedding_dim, embedding.len())?;
        return Ok(embedding);
    }

    let mut sum = vec![0.0f32; settings.embedding_dim];
    for (index, chunk) in chunks.iter().enumerate() {
        if index > 0 && settings.chunk_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(settings.chunk_delay_ms)).await;
        }
        let embedding = embedder.embed(chunk).await?;
        check_dim(settings.embedding_dim, embedding.len())?;
        for (slot, value) in sum.iter_mut().zip(embedding.iter()) {
            *slot += value;
        }
    }

    let count = chunks.len() as f32;
    Ok(sum.into_iter().map(|value| value / count).collect())
}

fn check_dim(expected: usize, actual: usize) -> KnowledgeResult<()> {
    if expected != actual {
        return Err(KnowledgeError::EmbeddingDimMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk_text;

    /// Returns `[byte length, 7.0]` so aggregation is easy to predict.
    struct LengthEmbedder;

    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
            Ok(vec![text.len() as f32, 7.0])
        }
    }

    struct WrongDimEmbedder;

    impl Embedder for WrongDimEmbedder {
        async fn embed(&self, _text: &str) -> KnowledgeResult<Vec<f32>> {
            Ok(vec![1.0, 2.0, 3.0])
        }
    }

    fn settings(max_bytes: usize) -> KnowledgeSettings {
        KnowledgeSettings {
            embedding_dim: 2,
            chunk_max_bytes: max_bytes,
            chunk_overlap_bytes: 0,
            chunk_delay_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn single_chunk_returns_model_output_exactly() {
        let settings = settings(1000);
        let text = "short query";
        let out = embed_document(&LengthEmbedder, &settings, text).await.unwrap();
        assert_eq!(out, vec![text.len() as f32, 7.0]);
    }

    #[tokio::test]
    async fn multi_chunk_output_is_the_per_dimension_mean() {
        let settings = settings(40);
        let text = "First sentence goes here. Second sentence goes here. Third sentence goes here.";
        let chunks = chunk_text(text, settings.chunk_max_bytes, settings.chunk_overlap_bytes);
        assert!(chunks.len() > 1, "test text must chunk");

        let expected: f32 =
            chunks.iter().map(|c| c.len() as f32).sum::<f32>() / chunks.len() as f32;
        let out = embed_document(&LengthEmbedder, &settings, text).await.unwrap();
        assert!((out[0] - expected).abs() < 1e-4);
        assert!((out[1] - 7.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let settings = settings(1000);
        let err = embed_document(&WrongDimEmbedder, &settings, "query")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            KnowledgeError::EmbeddingDimMismatch { expected: 2, actual: 3 }
        ));
    }
}
