use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Trait for embedding generation providers
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, model: EmbeddingModel, text: &str) -> VectorResult<EmbeddingResult>;

    /// Generate embeddings for multiple texts in batch, in input order
    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> VectorResult<Vec<EmbeddingResult>>;
}
