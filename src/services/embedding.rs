use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AppError, CHUNK_OVERLAP, CHUNK_SIZE, EmbeddingConfig, PineconeConfig, split_text};

/// One chunk of a document together with its embedding vector, ready for the
/// vector index. The original text travels along as metadata so query hits can
/// be shown verbatim.
#[derive(Clone, Debug, Serialize)]
pub struct EmbeddedChunk {
    pub id: Uuid,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk: String,
    pub timestamp: String,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError>;

    /// Splits the document into overlapping chunks and embeds each one.
    async fn embed_document(&self, text: &str) -> Result<Vec<EmbeddedChunk>, AppError> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        let mut chunks = Vec::new();

        for chunk in split_text(text, CHUNK_SIZE, CHUNK_OVERLAP) {
            let values = self.embed_one(&chunk).await?;
            chunks.push(EmbeddedChunk {
                id: Uuid::new_v4(),
                values,
                metadata: ChunkMetadata {
                    chunk,
                    timestamp: timestamp.clone(),
                },
            });
        }

        Ok(chunks)
    }
}

/// Hugging Face inference API feature-extraction pipeline.
pub struct HuggingFaceEmbedder {
    http: reqwest::Client,
    config: EmbeddingConfig,
}

impl HuggingFaceEmbedder {
    #[must_use]
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    #[tracing::instrument(skip(self, text), fields(chars = text.len()))]
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let url = format!(
            "https://api-inference.huggingface.co/pipeline/feature-extraction/{}",
            self.config.model
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "inputs": text, "options": { "wait_for_model": true } }))
            .send()
            .await?
            .error_for_status()?;

        let vector: Vec<f32> = response.json().await?;
        Ok(vector)
    }
}

/// A hit returned from a similarity query, highest score first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<ChunkMetadata>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, namespace: &str, chunks: &[EmbeddedChunk]) -> Result<(), AppError>;
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ChunkMatch>, AppError>;
    async fn delete_namespace(&self, namespace: &str) -> Result<(), AppError>;
}

/// Pinecone serverless index over its data-plane REST API.
pub struct PineconeIndex {
    http: reqwest::Client,
    config: PineconeConfig,
}

#[derive(Deserialize)]
struct PineconeQueryResponse {
    #[serde(default)]
    matches: Vec<ChunkMatch>,
}

impl PineconeIndex {
    #[must_use]
    pub fn new(config: PineconeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("https://{}/{path}", self.config.index_host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[tracing::instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn upsert(&self, namespace: &str, chunks: &[EmbeddedChunk]) -> Result<(), AppError> {
        self.http
            .post(self.endpoint("vectors/upsert"))
            .header("Api-Key", &self.config.api_key)
            .json(&json!({ "namespace": namespace, "vectors": chunks }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    #[tracing::instrument(skip(self, vector))]
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ChunkMatch>, AppError> {
        let response = self
            .http
            .post(self.endpoint("query"))
            .header("Api-Key", &self.config.api_key)
            .json(&json!({
                "namespace": namespace,
                "vector": vector,
                "topK": top_k,
                "includeMetadata": true,
            }))
            .send()
            .await?
            .error_for_status()?;

        let parsed: PineconeQueryResponse = response.json().await?;
        Ok(parsed.matches)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_namespace(&self, namespace: &str) -> Result<(), AppError> {
        self.http
            .post(self.endpoint("vectors/delete"))
            .header("Api-Key", &self.config.api_key)
            .json(&json!({ "namespace": namespace, "deleteAll": true }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        #[allow(clippy::cast_precision_loss)]
        async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
            Ok(vec![text.len() as f32])
        }
    }

    #[tokio::test]
    async fn embed_document_produces_a_chunk_per_split() {
        let text = "word ".repeat(300);
        let chunks = FixedEmbedder.embed_document(&text).await.unwrap();

        assert_eq!(chunks.len(), split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP).len());
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.values.is_empty());
            assert!(!chunk.metadata.chunk.is_empty());
        }
    }

    #[tokio::test]
    async fn embed_document_assigns_unique_ids() {
        let text = "word ".repeat(300);
        let chunks = FixedEmbedder.embed_document(&text).await.unwrap();

        let mut ids: Vec<Uuid> = chunks.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), chunks.len());
    }

    #[test]
    fn chunk_serializes_for_upsert() {
        let chunk = EmbeddedChunk {
            id: Uuid::new_v4(),
            values: vec![0.1, 0.2],
            metadata: ChunkMetadata {
                chunk: "hello".to_string(),
                timestamp: "1700000000".to_string(),
            },
        };

        let value = serde_json::to_value(&chunk).unwrap();
        assert!(value["id"].is_string());
        assert_eq!(value["values"].as_array().unwrap().len(), 2);
        assert_eq!(value["metadata"]["chunk"], "hello");
    }
}
