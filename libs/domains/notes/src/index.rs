use async_trait::async_trait;
use domain_vector::{
    CollectionConfig, DistanceMetric, EmbeddingModel, EmbeddingProvider, SearchQuery, Vector,
    VectorRepository,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::NoteResult;
use crate::models::Note;

/// Payload key carrying the owner identity on every point
pub const OWNER_PAYLOAD_KEY: &str = "user_id";

/// Similarity index over notes, keyed by note id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteIndex: Send + Sync {
    /// Embed the note and upsert its point
    async fn index(&self, note: &Note) -> NoteResult<()>;

    /// Remove the note's point; a missing point is not an error
    async fn remove(&self, id: Uuid) -> NoteResult<()>;

    /// Ids of the owner's most similar notes with their scores, best first
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: u64,
    ) -> NoteResult<Vec<(Uuid, f32)>>;
}

/// NoteIndex backed by an embedding provider and a vector repository
pub struct SemanticNoteIndex {
    embeddings: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorRepository>,
    collection: String,
    model: EmbeddingModel,
}

impl SemanticNoteIndex {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorRepository>,
        collection: impl Into<String>,
        model: EmbeddingModel,
    ) -> Self {
        Self {
            embeddings,
            vectors,
            collection: collection.into(),
            model,
        }
    }

    pub fn collection_config(&self) -> CollectionConfig {
        CollectionConfig::new(&self.collection, self.model.dimension())
            .with_distance(DistanceMetric::Cosine)
            .with_keyword_index(OWNER_PAYLOAD_KEY)
    }

    /// Create the collection when missing. Returns `true` when created.
    pub async fn ensure_collection(&self) -> NoteResult<bool> {
        let created = self
            .vectors
            .ensure_collection(&self.collection_config())
            .await?;

        if created {
            tracing::info!(collection = %self.collection, "Created notes collection");
        }
        Ok(created)
    }

    pub async fn health_check(&self) -> NoteResult<()> {
        Ok(self.vectors.health_check().await?)
    }
}

#[async_trait]
impl NoteIndex for SemanticNoteIndex {
    async fn index(&self, note: &Note) -> NoteResult<()> {
        let embedding = self
            .embeddings
            .embed(self.model, &note.embedding_text())
            .await?;

        let vector = Vector::new(note.id, embedding.values)
            .with_payload(OWNER_PAYLOAD_KEY, note.user_id.clone());

        self.vectors.upsert(&self.collection, vector, true).await?;

        tracing::debug!(note_id = %note.id, tokens = embedding.tokens_used, "Indexed note");
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> NoteResult<()> {
        self.vectors.delete(&self.collection, vec![id], true).await?;
        tracing::debug!(note_id = %id, "Removed note from index");
        Ok(())
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: u64,
    ) -> NoteResult<Vec<(Uuid, f32)>> {
        let embedding = self.embeddings.embed(self.model, query).await?;

        let query =
            SearchQuery::new(embedding.values, limit).with_match(OWNER_PAYLOAD_KEY, user_id);
        let hits = self.vectors.search(&self.collection, query).await?;

        Ok(hits.into_iter().map(|hit| (hit.id, hit.score)).collect())
    }
}
