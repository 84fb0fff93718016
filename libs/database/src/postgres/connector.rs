use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::config::PostgresConfig;
use crate::common::error::{DatabaseError, DatabaseResult};
use crate::common::retry::{RetryConfig, retry_with_backoff};

/// Connect to PostgreSQL with the given connect options
pub async fn connect(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    info!("connected to postgres");
    Ok(db)
}

/// Connect to PostgreSQL using a [`PostgresConfig`]
pub async fn connect_from_config(config: &PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    connect(config.clone().into_connect_options())
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Connect to PostgreSQL, retrying with exponential backoff on failure
///
/// Transient startup races (database container still booting, DNS not yet
/// resolvable) are the common case in orchestrated deployments, so the
/// default retry policy is applied unless one is provided.
pub async fn connect_with_retry(
    options: ConnectOptions,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<DatabaseConnection> {
    let retry_config = retry_config.unwrap_or_default();
    retry_with_backoff(
        || {
            let options = options.clone();
            async move {
                connect(options)
                    .await
                    .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
            }
        },
        retry_config,
    )
    .await
}

/// Connect from config, retrying with exponential backoff on failure
pub async fn connect_from_config_with_retry(
    config: &PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<DatabaseConnection> {
    connect_with_retry(config.clone().into_connect_options(), retry_config).await
}

/// Run all pending migrations for the given migrator
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> DatabaseResult<()> {
    info!("running database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!("database migrations complete");
    Ok(())
}
