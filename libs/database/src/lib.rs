//! PostgreSQL connectivity for the notes service.
//!
//! - `postgres`: pool configuration, connection, migrations and health checks (SeaORM)
//! - `config` feature: `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use database::postgres::{PostgresConfig, connect_from_config, run_migrations};
//!
//! let db = connect_from_config(PostgresConfig::from_env()?).await?;
//! run_migrations::<migration::Migrator>(&db, "notes_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
