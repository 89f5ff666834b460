//! PostgreSQL 连接池
//!
//! 排行管线的所有仓储共享同一个 `PgPool`。管线自身不设超时，
//! 连接获取的等待上限由 `DatabaseConfig::connect_timeout_seconds` 决定。

use std::path::Path;
use std::time::{Duration, Instant};

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;
use crate::error::Result;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[instrument(skip(config), fields(max = config.max_connections, min = config.min_connections))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await?;

        info!("PostgreSQL pool ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 执行 `dir` 下尚未应用的迁移
    ///
    /// 迁移目录在运行时读取，便于各服务各自维护表结构
    pub async fn run_migrations(&self, dir: &Path) -> Result<()> {
        Migrator::new(dir).await?.run(&self.pool).await?;

        info!(dir = %dir.display(), "Migrations applied");
        Ok(())
    }

    /// 往返一次 `SELECT 1`，返回耗时
    pub async fn health_check(&self) -> Result<Duration> {
        let started = Instant::now();
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;

        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        debug!(elapsed_ms, "Database health check");
        Ok(elapsed)
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_database_config;

    #[tokio::test]
    #[ignore] // 需要数据库连接
    async fn test_connect_and_ping() {
        let db = Database::connect(&test_database_config()).await.unwrap();
        assert!(db.health_check().await.unwrap() < Duration::from_secs(5));
        db.close().await;
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    #[ignore] // 需要数据库连接
    async fn test_missing_migration_dir_is_an_error() {
        let db = Database::connect(&test_database_config()).await.unwrap();
        let err = db
            .run_migrations(Path::new("/nonexistent/catalog/migrations"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MIGRATION_ERROR");
    }
}
