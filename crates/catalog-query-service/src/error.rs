//! 查询服务错误类型
//!
//! 区分需要传播给调用方的错误（分类不存在、存储不可用）与管线内部静默处理的情况。
//! 门槛未达标、校验剔除、缓存 ID 失效都不是错误，统一走空状态分支。

use catalog_shared::error::CatalogError;
use thiserror::Error;

/// 查询服务错误类型
#[derive(Debug, Error)]
pub enum QueryError {
    // === 业务错误 ===
    #[error("书籍分类不存在: {0}")]
    CategoryNotFound(i64),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("缓存错误: {0}")]
    Cache(String),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 查询服务 Result 类型别名
pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    /// 检查是否为可重试的错误
    ///
    /// 本服务不做重试，由存储客户端或调用方决定
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Cache(_))
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// 基础设施错误原样映射，数据库错误保留原始 sqlx::Error
impl From<CatalogError> for QueryError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Database(e) => Self::Database(e),
            CatalogError::Serialization(e) => Self::Serialization(e),
            CatalogError::Redis(e) => Self::Cache(e.to_string()),
            CatalogError::Config(e) => Self::Internal(e.to_string()),
            CatalogError::Migration(e) => Self::Internal(e.to_string()),
            CatalogError::Internal(msg) => Self::Internal(msg),
        }
    }
}
