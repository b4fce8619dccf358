use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult};

/// Open a pooled connection using `config`.
///
/// ```ignore
/// let db = connect_from_config(PostgresConfig::from_env()?).await?;
/// ```
pub async fn connect_from_config(config: PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    let max_connections = config.max_connections;
    let db = Database::connect(config.into_connect_options()).await?;

    info!(max_connections, "Connected to PostgreSQL");
    Ok(db)
}

/// Apply all pending migrations of `M`.
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!("Running {} database migrations...", app_name);
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!("Migrations completed successfully for {}", app_name);
    Ok(())
}
