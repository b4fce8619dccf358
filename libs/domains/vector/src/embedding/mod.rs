mod openai;
mod provider;

pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;

#[cfg(any(test, feature = "mock"))]
pub use provider::MockEmbeddingProvider;
