//! Schema migrations embedded from the workspace `migrations/` directory.

use sqlx::PgPool;
use tracing::info;

use mentorlink_core::error::{AppError, ErrorKind};

/// Apply every migration the database has not seen yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(available = migrator.iter().count(), "Applying schema migrations");

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::StorageUnavailable,
            format!("Schema migration failed: {e}"),
            e,
        )
    })?;

    info!("Schema is up to date");
    Ok(())
}
