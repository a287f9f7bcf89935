//! PostgreSQL pool setup.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use mentorlink_core::config::DatabaseConfig;
use mentorlink_core::error::{AppError, ErrorKind};

/// Shared handle to the sqlx PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool sized by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let redacted = redact_url(&config.url);
        info!(
            url = %redacted,
            max_connections = config.max_connections,
            "Opening PostgreSQL pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!(url = %redacted, error = %e, "PostgreSQL unreachable");
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    format!("Failed to connect to {redacted}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// Borrow the sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Database health check failed", e)
            })
    }

    /// Drain and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

/// Replace the password in a connection URL with `****`.
fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|p| p + 3) else {
        return url.to_string();
    };
    let Some(at) = url[scheme_end..].find('@').map(|p| p + scheme_end) else {
        return url.to_string();
    };
    match url[scheme_end..at].find(':') {
        Some(colon) => {
            let user_end = scheme_end + colon;
            format!("{}:****{}", &url[..user_end], &url[at..])
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("postgres://mentor:hunter2@db:5432/mentorlink"),
            "postgres://mentor:****@db:5432/mentorlink"
        );
        assert_eq!(
            redact_url("postgres://mentor@db/mentorlink"),
            "postgres://mentor@db/mentorlink"
        );
        assert_eq!(redact_url("postgres://db/mentorlink"), "postgres://db/mentorlink");
    }
}
