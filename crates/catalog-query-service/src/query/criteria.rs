//! 门槛判定
//!
//! 分类的互动积分总和达到门槛后才允许执行排行查询。
//! 积分总和在一次调用内只计算一次，保存在 `QueryContext` 中。

use std::sync::Arc;

use tracing::{debug, instrument};

use super::context::QueryContext;
use crate::error::Result;
use crate::repository::CategoryRepositoryTrait;

pub struct CriteriaGate<CR: CategoryRepositoryTrait> {
    category_repo: Arc<CR>,
}

impl<CR: CategoryRepositoryTrait> CriteriaGate<CR> {
    pub fn new(category_repo: Arc<CR>) -> Self {
        Self { category_repo }
    }

    /// 分类互动积分总和（本次调用内缓存）
    pub async fn measure(&self, ctx: &QueryContext) -> Result<i64> {
        let value = ctx
            .criteria_slot()
            .get_or_try_init(|| self.category_repo.sum_engagement_points(ctx.category_id()))
            .await?;
        Ok(*value)
    }

    /// 积分总和大于等于门槛即通过
    #[instrument(skip(self, ctx), fields(category_id = ctx.category_id(), threshold = ctx.threshold()))]
    pub async fn passes(&self, ctx: &QueryContext) -> Result<bool> {
        let value = self.measure(ctx).await?;
        let passed = value >= ctx.threshold();
        debug!(value, passed, "Criteria evaluated");
        Ok(passed)
    }
}
