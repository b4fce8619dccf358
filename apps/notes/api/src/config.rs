use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_flag, env_or_default, env_parse,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use domain_vector::{EmbeddingModel, OpenAIConfig, QdrantConfig};

pub use core_config::Environment;

/// Embedding and vector index settings, present only when semantic search is on
#[derive(Clone, Debug)]
pub struct SemanticConfig {
    pub openai: OpenAIConfig,
    pub qdrant: QdrantConfig,
    pub collection: String,
    pub model: EmbeddingModel,
    pub reconcile_batch: u64,
}

impl FromEnv for SemanticConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let model = env_or_default("EMBEDDING_MODEL", EmbeddingModel::default().model_name())
            .parse()
            .map_err(|details| ConfigError::Invalid {
                key: "EMBEDDING_MODEL".to_string(),
                details,
            })?;

        Ok(Self {
            openai: OpenAIConfig::from_env()?,
            qdrant: QdrantConfig::from_env()?,
            collection: env_or_default("NOTES_COLLECTION", "notes"),
            model,
            reconcile_batch: env_parse("REINDEX_BATCH_SIZE", 100u64)?,
        })
    }
}

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub jwt: JwtConfig,
    pub semantic: Option<SemanticConfig>,
    pub run_migrations: bool,
}

impl Config {
    /// Fails when a required variable is missing, including the API keys of
    /// the embedding service and vector index while semantic search is on.
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let database = PostgresConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        let semantic = if env_flag("SEMANTIC_SEARCH_ENABLED", true)? {
            Some(SemanticConfig::from_env()?)
        } else {
            None
        };

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            database,
            jwt,
            semantic,
            run_migrations: env_flag("RUN_MIGRATIONS", true)?,
        })
    }
}
