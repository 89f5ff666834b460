//! 查询上下文
//!
//! 每次管线调用创建一个 `QueryContext`，调用结束即丢弃。
//! 参数由进程级 `RankingConfig` 提供默认值，调用方可通过 `RankingOptions` 单独覆盖。

use std::time::Duration;

use catalog_shared::config::{InclusionMode, RankingConfig};
use tokio::sync::OnceCell;

use crate::error::{QueryError, Result};
use crate::models::CategorySubject;

/// 单次调用的参数覆盖
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingOptions {
    pub threshold: Option<i64>,
    pub limit: Option<i64>,
    pub related_limit: Option<i64>,
    pub min_readers: Option<i64>,
    pub cache_ttl: Option<Duration>,
}

impl RankingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_related_limit(mut self, related_limit: i64) -> Self {
        self.related_limit = Some(related_limit);
        self
    }

    pub fn with_min_readers(mut self, min_readers: i64) -> Self {
        self.min_readers = Some(min_readers);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }
}

/// 查询上下文
///
/// 除门槛值外全部字段在构造后不再变化。门槛值（分类互动积分总和）
/// 在首次需要时计算一次并保存在上下文内，作用域严格限定为本次调用。
#[derive(Debug, Clone)]
pub struct QueryContext {
    subject: CategorySubject,
    threshold: i64,
    limit: i64,
    related_limit: i64,
    min_readers: i64,
    cache_ttl: Duration,
    inclusion_mode: InclusionMode,
    criteria_value: OnceCell<i64>,
}

impl QueryContext {
    pub fn new(
        subject: CategorySubject,
        config: &RankingConfig,
        options: &RankingOptions,
    ) -> Result<Self> {
        let limit = options.limit.unwrap_or(config.limit);
        if limit <= 0 {
            return Err(QueryError::Validation(format!(
                "limit must be positive, got {}",
                limit
            )));
        }

        let related_limit = options.related_limit.unwrap_or(config.related_limit);
        if related_limit < 0 {
            return Err(QueryError::Validation(format!(
                "related_limit must not be negative, got {}",
                related_limit
            )));
        }

        Ok(Self {
            subject,
            threshold: options.threshold.unwrap_or(config.threshold),
            limit,
            related_limit,
            min_readers: options.min_readers.unwrap_or(config.min_readers),
            cache_ttl: options.cache_ttl.unwrap_or_else(|| config.cache_ttl()),
            inclusion_mode: config.inclusion,
            criteria_value: OnceCell::new(),
        })
    }

    pub fn subject(&self) -> &CategorySubject {
        &self.subject
    }

    pub fn category_id(&self) -> i64 {
        self.subject.id()
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn related_limit(&self) -> i64 {
        self.related_limit
    }

    pub fn min_readers(&self) -> i64 {
        self.min_readers
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// 纳入过滤的数据来源，取自部署配置
    pub fn inclusion_mode(&self) -> InclusionMode {
        self.inclusion_mode
    }

    /// 本次调用内的门槛值缓存槽
    pub(crate) fn criteria_slot(&self) -> &OnceCell<i64> {
        &self.criteria_value
    }
}
