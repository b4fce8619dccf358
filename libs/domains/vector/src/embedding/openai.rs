use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::{EmbeddingModel, EmbeddingResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Environment variables:
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_BASE_URL` (default: `https://api.openai.com/v1`)
/// - `OPENAI_TIMEOUT_SECS` (default: 30)
impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("OPENAI_API_KEY")?,
            base_url: env_or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            timeout_secs: env_parse("OPENAI_TIMEOUT_SECS", 30u64)?,
        })
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> VectorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: EmbeddingUsage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

fn into_results(
    response: EmbeddingResponse,
    expected: usize,
    model: EmbeddingModel,
) -> VectorResult<Vec<EmbeddingResult>> {
    if response.data.len() != expected {
        return Err(VectorError::Embedding(format!(
            "Expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    let mut data = response.data;
    data.sort_by_key(|d| d.index);

    let tokens_per_embedding = response.usage.total_tokens / expected.max(1) as u32;

    data.into_iter()
        .map(|d| {
            let dimension = d.embedding.len() as u32;
            if dimension != model.dimension() {
                return Err(VectorError::DimensionMismatch {
                    expected: model.dimension(),
                    actual: dimension,
                });
            }
            Ok(EmbeddingResult {
                dimension,
                values: d.embedding,
                tokens_used: tokens_per_embedding,
            })
        })
        .collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed(&self, model: EmbeddingModel, text: &str) -> VectorResult<EmbeddingResult> {
        let results = self.embed_batch(model, &[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> VectorResult<Vec<EmbeddingResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: model.model_name(),
            input: texts,
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await?;
        let results = into_results(body, texts.len(), model)?;

        tracing::debug!(
            model = model.model_name(),
            count = results.len(),
            "Generated embeddings"
        );
        Ok(results)
    }
}
