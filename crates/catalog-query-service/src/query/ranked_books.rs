//! 分类排行管线
//!
//! 执行顺序：
//!
//! 1. 受限分类或门槛未达标：直接进入空状态，不访问缓存也不再查询
//! 2. 读取缓存；命中则按 ID 重新读取，未命中则规划并执行排行查询
//! 3. 附加关联数据并剔除悬空关联（命中与未命中两条路径一致）
//! 4. 校验后为空则进入空状态

use std::sync::Arc;

use catalog_shared::cache::CacheStore;
use catalog_shared::config::RankingConfig;
use catalog_shared::observability::metrics;
use tracing::{debug, info, instrument};

use super::context::QueryContext;
use super::criteria::CriteriaGate;
use super::empty_state::EmptyStateProvider;
use super::loader::BoundedRelatedLoader;
use super::planner::QueryPlanner;
use super::result_cache::{FetchSource, ResultCache};
use super::validator::ResultValidator;
use crate::error::Result;
use crate::models::{RankedBook, RankedEntry};
use crate::repository::{BookRepositoryTrait, CategoryRepositoryTrait};

/// 短路原因，同时用作指标标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortCircuit {
    Restricted,
    BelowThreshold,
}

impl ShortCircuit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restricted => "restricted",
            Self::BelowThreshold => "below_threshold",
        }
    }
}

pub struct RankedBooksQuery<CR, BR>
where
    CR: CategoryRepositoryTrait,
    BR: BookRepositoryTrait,
{
    gate: CriteriaGate<CR>,
    planner: QueryPlanner<BR>,
    cache: ResultCache<BR>,
    loader: BoundedRelatedLoader<BR>,
    empty_state: EmptyStateProvider<BR>,
}

impl<CR, BR> RankedBooksQuery<CR, BR>
where
    CR: CategoryRepositoryTrait,
    BR: BookRepositoryTrait,
{
    pub fn new(
        category_repo: Arc<CR>,
        book_repo: Arc<BR>,
        store: Arc<dyn CacheStore>,
        config: &RankingConfig,
    ) -> Self {
        Self {
            gate: CriteriaGate::new(category_repo),
            planner: QueryPlanner::new(book_repo.clone()),
            cache: ResultCache::new(book_repo.clone(), store),
            loader: BoundedRelatedLoader::new(book_repo.clone()),
            empty_state: EmptyStateProvider::new(book_repo, config.empty_state.clone()),
        }
    }

    /// 分类排行
    #[instrument(skip(self, ctx), fields(category_id = ctx.category_id(), limit = ctx.limit()))]
    pub async fn get(&self, ctx: &QueryContext) -> Result<Vec<RankedEntry>> {
        if let Some(reason) = self.short_circuit(ctx).await? {
            info!(reason = reason.as_str(), "Ranked query short-circuited");
            metrics::record_short_circuit(reason.as_str());
            return self.empty_state.provide(ctx).await;
        }

        let fetched = self.cache.fetch(ctx, || self.compute(ctx)).await?;
        let records = match fetched.source {
            FetchSource::Computed => fetched.records,
            FetchSource::Cache => self.finish(fetched.records, ctx).await?,
        };

        if records.is_empty() {
            debug!(strategy = ?self.empty_state.strategy(), "No ranked books after validation");
            return self.empty_state.provide(ctx).await;
        }

        debug!(count = records.len(), source = ?fetched.source, "Ranked books resolved");
        Ok(records.into_iter().map(RankedEntry::Book).collect())
    }

    /// 满足排行过滤条件的书籍总数（不受 limit 约束，不走缓存）
    ///
    /// 短路时返回 0
    #[instrument(skip(self, ctx), fields(category_id = ctx.category_id()))]
    pub async fn count(&self, ctx: &QueryContext) -> Result<i64> {
        if let Some(reason) = self.short_circuit(ctx).await? {
            debug!(reason = reason.as_str(), "Ranked count short-circuited");
            return Ok(0);
        }

        let plan = self.planner.plan(ctx).await?;
        self.planner.count(&plan).await
    }

    /// 受限分类先于门槛判断，避免一次聚合查询
    async fn short_circuit(&self, ctx: &QueryContext) -> Result<Option<ShortCircuit>> {
        if ctx.subject().category.is_restricted() {
            return Ok(Some(ShortCircuit::Restricted));
        }
        if !self.gate.passes(ctx).await? {
            return Ok(Some(ShortCircuit::BelowThreshold));
        }
        Ok(None)
    }

    async fn compute(&self, ctx: &QueryContext) -> Result<Vec<RankedBook>> {
        let plan = self.planner.plan(ctx).await?;
        let records = self.planner.execute(&plan).await?;
        self.finish(records, ctx).await
    }

    async fn finish(
        &self,
        mut records: Vec<RankedBook>,
        ctx: &QueryContext,
    ) -> Result<Vec<RankedBook>> {
        self.loader
            .attach(&mut records, ctx.subject(), ctx.related_limit())
            .await?;
        Ok(ResultValidator::filter(records))
    }
}
