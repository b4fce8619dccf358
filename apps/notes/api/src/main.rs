use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config, run_migrations};
use domain_notes::SemanticNoteIndex;
use domain_vector::{OpenAIProvider, QdrantRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::{Config, SemanticConfig};
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Missing keys abort here, before any client is built
    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = connect_from_config(config.database.clone())
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        run_migrations::<migration::Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    let index = match &config.semantic {
        Some(semantic) => Some(Arc::new(build_index(semantic).await?)),
        None => {
            info!("Semantic search disabled (SEMANTIC_SEARCH_ENABLED=false)");
            None
        }
    };

    let jwt_auth = axum_helpers::JwtAuth::new(&config.jwt);

    let state = AppState {
        config,
        db,
        jwt_auth,
        index,
    };

    if let Some(semantic) = &state.config.semantic {
        let repaired = api::notes::service(&state)
            .reconcile_index(semantic.reconcile_batch)
            .await
            .map_err(|e| eyre::eyre!("Index reconciliation failed: {}", e))?;
        info!(repaired, "Index reconciliation complete");
    }

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.server)?;

    // - /health: liveness with app name/version
    // - /ready: database and Qdrant reachability
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!("Starting notes API with graceful shutdown (30s timeout)");

    let server = state.config.server.clone();
    create_production_app(app, &server, Duration::from_secs(30), async move {
        info!("Shutting down: closing database connections");
        match state.db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Notes API shutdown complete");
    Ok(())
}

/// Builds the embedding and Qdrant clients and makes sure the collection exists
async fn build_index(semantic: &SemanticConfig) -> eyre::Result<SemanticNoteIndex> {
    info!(
        url = %semantic.qdrant.url,
        collection = %semantic.collection,
        "Configuring semantic search"
    );

    let embeddings = OpenAIProvider::new(semantic.openai.clone())
        .map_err(|e| eyre::eyre!("Failed to build embedding client: {}", e))?;
    let vectors = QdrantRepository::new(semantic.qdrant.clone())
        .map_err(|e| eyre::eyre!("Failed to build Qdrant client: {}", e))?;

    let index = SemanticNoteIndex::new(
        Arc::new(embeddings),
        Arc::new(vectors),
        semantic.collection.clone(),
        semantic.model,
    );

    index
        .ensure_collection()
        .await
        .map_err(|e| eyre::eyre!("Failed to prepare notes collection: {}", e))?;

    Ok(index)
}
