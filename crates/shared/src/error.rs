//! 存储与配置层错误
//!
//! 查询层通过 `From<CatalogError>` 把这些错误折叠进自己的错误类型，
//! 因此这里只区分来源，不区分业务含义。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// 连接失败与命令失败都归到这里，缓存值解码失败不算
    #[error("Redis 错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Migration(_) => "MIGRATION_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 存储连接类故障可由调用方重试，本库内部不重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Redis(_))
    }
}
