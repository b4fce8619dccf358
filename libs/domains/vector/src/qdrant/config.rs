use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout_secs: 30,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Environment variables:
/// - `QDRANT_URL` (default: `http://localhost:6334`, gRPC port)
/// - `QDRANT_API_KEY` (required)
/// - `QDRANT_TIMEOUT_SECS` (default: 30)
impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", "http://localhost:6334"),
            api_key: Some(env_required("QDRANT_API_KEY")?),
            timeout_secs: env_parse("QDRANT_TIMEOUT_SECS", 30u64)?,
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self::new("http://localhost:6334")
    }
}
