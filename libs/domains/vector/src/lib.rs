//! Vector adapters for semantic note search.
//!
//! ```text
//! ┌──────────────────┐     ┌───────────────────┐
//! │ VectorRepository │     │ EmbeddingProvider │
//! │     (trait)      │     │      (trait)      │
//! └────────┬─────────┘     └─────────┬─────────┘
//!          │                         │
//! ┌────────▼─────────┐     ┌─────────▼─────────┐
//! │ QdrantRepository │     │  OpenAIProvider   │
//! └──────────────────┘     └───────────────────┘
//! ```
//!
//! Both clients are constructed once at startup and shared behind `Arc`.
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_vector::{
//!     CollectionConfig, EmbeddingModel, EmbeddingProvider, OpenAIConfig, OpenAIProvider,
//!     QdrantConfig, QdrantRepository, Vector, VectorRepository,
//! };
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let qdrant = QdrantRepository::new(QdrantConfig::from_env()?)?;
//! let openai = OpenAIProvider::new(OpenAIConfig::from_env()?)?;
//!
//! let model = EmbeddingModel::TextEmbeddingAda002;
//! qdrant
//!     .ensure_collection(&CollectionConfig::new("notes", model.dimension()))
//!     .await?;
//!
//! let embedding = openai.embed(model, "Groceries\n\nmilk, eggs").await?;
//! qdrant
//!     .upsert("notes", Vector::new(Uuid::now_v7(), embedding.values), true)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod models;
pub mod qdrant;
pub mod repository;

pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{VectorError, VectorResult};
pub use models::{
    CollectionConfig, DistanceMetric, EmbeddingModel, EmbeddingResult, SearchQuery, SearchResult,
    Vector,
};
pub use qdrant::{QdrantConfig, QdrantRepository};
pub use repository::VectorRepository;

#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingProvider;
#[cfg(any(test, feature = "mock"))]
pub use repository::MockVectorRepository;
