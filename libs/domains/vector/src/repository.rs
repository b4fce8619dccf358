use async_trait::async_trait;
use uuid::Uuid;

use crate::error::VectorResult;
use crate::models::{CollectionConfig, SearchQuery, SearchResult, Vector};

/// Storage operations against the vector index.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    async fn collection_exists(&self, name: &str) -> VectorResult<bool>;

    async fn create_collection(&self, config: &CollectionConfig) -> VectorResult<()>;

    /// Create the collection unless it already exists. Returns `true` when created.
    async fn ensure_collection(&self, config: &CollectionConfig) -> VectorResult<bool> {
        if self.collection_exists(&config.name).await? {
            return Ok(false);
        }
        self.create_collection(config).await?;
        Ok(true)
    }

    /// Insert or replace one point. With `wait`, returns after the write is applied.
    async fn upsert(&self, collection: &str, vector: Vector, wait: bool) -> VectorResult<Uuid>;

    /// Delete points by id; missing ids are not an error.
    async fn delete(&self, collection: &str, ids: Vec<Uuid>, wait: bool) -> VectorResult<u32>;

    async fn search(&self, collection: &str, query: SearchQuery) -> VectorResult<Vec<SearchResult>>;

    async fn health_check(&self) -> VectorResult<()>;
}
