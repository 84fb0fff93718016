use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::common::error::{DatabaseError, DatabaseResult};

/// Verify that the database connection is alive
///
/// Issues a trivial query against the pool. Intended for readiness probes.
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1");
    db.query_one(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?
        .ok_or_else(|| DatabaseError::HealthCheckFailed("no rows returned".to_string()))?;
    Ok(())
}
