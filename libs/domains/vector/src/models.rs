use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Distance metric for similarity calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
}

/// Collection layout, sized to the embedding model that fills it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionConfig {
    pub name: String,
    pub dimension: u32,
    pub distance: DistanceMetric,
    /// Payload fields that get a keyword index, for filters applied on every query
    pub keyword_indexes: Vec<String>,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>, dimension: u32) -> Self {
        Self {
            name: name.into(),
            dimension,
            distance: DistanceMetric::default(),
            keyword_indexes: Vec::new(),
        }
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_keyword_index(mut self, field: impl Into<String>) -> Self {
        self.keyword_indexes.push(field.into());
        self
    }
}

/// A vector point with a flat payload of scalar metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub id: Uuid,
    pub values: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

impl Vector {
    pub fn new(id: Uuid, values: Vec<f32>) -> Self {
        Self {
            id,
            values,
            payload: HashMap::new(),
        }
    }

    pub fn with_payload(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Nearest-neighbour query.
///
/// `must_match` holds exact keyword matches on payload fields; every pair must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub limit: u64,
    pub must_match: Vec<(String, String)>,
}

impl SearchQuery {
    pub fn new(vector: Vec<f32>, limit: u64) -> Self {
        Self {
            vector,
            limit,
            must_match: Vec::new(),
        }
    }

    pub fn with_match(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.must_match.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: Uuid,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Embedding model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmbeddingModel {
    #[default]
    TextEmbeddingAda002,
    TextEmbedding3Small,
    TextEmbedding3Large,
}

impl EmbeddingModel {
    pub fn model_name(&self) -> &'static str {
        match self {
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
        }
    }

    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::TextEmbeddingAda002 | EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
        }
    }
}

impl std::str::FromStr for EmbeddingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text-embedding-ada-002" => Ok(EmbeddingModel::TextEmbeddingAda002),
            "text-embedding-3-small" => Ok(EmbeddingModel::TextEmbedding3Small),
            "text-embedding-3-large" => Ok(EmbeddingModel::TextEmbedding3Large),
            other => Err(format!("unknown embedding model '{}'", other)),
        }
    }
}

/// Result of embedding one text
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: u32,
}
