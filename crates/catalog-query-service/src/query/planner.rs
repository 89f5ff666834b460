//! 排行查询规划
//!
//! `RankingPlan` 是纯数据描述，按固定顺序渲染 SQL：
//! 可见性过滤 -> 指标关联 -> 纳入过滤 -> 显式排序 -> 条数限制。
//! 仓储层只负责执行渲染结果，规划本身不依赖数据库即可测试。

use std::sync::Arc;

use catalog_shared::config::InclusionMode;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, instrument};

use super::context::QueryContext;
use crate::error::Result;
use crate::models::{Priority, RankedBook};
use crate::repository::BookRepositoryTrait;

/// 排行查询返回的列（书籍列 + 指标列）
pub const RANKED_COLUMNS: &str = "books.id, books.title, books.category_id, books.user_id, \
     books.publisher_id, books.published_by, books.editor_id, books.is_premium, \
     books.published_at, books.created_at, books.updated_at, \
     book_metrics.priority, book_metrics.followers, book_metrics.readers";

/// 合作出版社范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartnerScope {
    /// 只包含仍在合作期内的出版社
    pub active_only: bool,
}

impl Default for PartnerScope {
    fn default() -> Self {
        Self { active_only: true }
    }
}

impl PartnerScope {
    fn push_select(&self, builder: &mut QueryBuilder<'static, Postgres>) {
        builder.push("SELECT publisher_id FROM partner_publishers");
        if self.active_only {
            builder.push(" WHERE is_active = TRUE");
        }
    }

    /// 独立查询合作出版社 ID 列表（物化模式使用）
    pub fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("");
        self.push_select(&mut builder);
        builder.push(" ORDER BY publisher_id");
        builder
    }
}

/// 纳入过滤的候选集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionSet {
    /// 内联子查询，由数据库在同一条语句中求值
    SubQuery(PartnerScope),
    /// 预先取出的出版社 ID 列表
    Materialized(Vec<i64>),
}

impl InclusionSet {
    /// 物化后为空集时没有任何书籍可以通过纳入过滤
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Materialized(ids) if ids.is_empty())
    }

    pub fn contains(&self, publisher_id: i64) -> Option<bool> {
        match self {
            Self::SubQuery(_) => None,
            Self::Materialized(ids) => Some(ids.contains(&publisher_id)),
        }
    }

    fn push_filter(&self, builder: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Self::SubQuery(scope) => {
                builder.push(" AND books.publisher_id IN (");
                scope.push_select(builder);
                builder.push(")");
            }
            Self::Materialized(ids) => {
                builder.push(" AND books.publisher_id = ANY(");
                builder.push_bind(ids.clone());
                builder.push(")");
            }
        }
    }
}

/// 排行查询计划
#[derive(Debug, Clone, PartialEq)]
pub struct RankingPlan {
    pub category_id: i64,
    /// 发布时间不晚于该时刻的书籍才可见
    pub as_of: DateTime<Utc>,
    /// 读者数需严格大于该值
    pub min_readers: i64,
    pub inclusion: InclusionSet,
    pub limit: i64,
}

impl RankingPlan {
    /// 数据源与全部过滤条件（不含排序和条数限制）
    fn push_source(&self, builder: &mut QueryBuilder<'static, Postgres>) {
        // 可见性
        builder.push(" FROM books");
        builder.push(" INNER JOIN book_metrics ON book_metrics.book_id = books.id");
        builder.push(" WHERE books.category_id = ");
        builder.push_bind(self.category_id);
        builder.push(" AND books.published_at IS NOT NULL AND books.published_at <= ");
        builder.push_bind(self.as_of);

        // 指标
        builder.push(" AND book_metrics.readers > ");
        builder.push_bind(self.min_readers);

        // 纳入
        self.inclusion.push_filter(builder);
    }

    /// 排序子句：优先级全序、关注数倒序，最后以 ID 保证稳定
    pub fn order_by_sql(&self) -> String {
        let cases: Vec<String> = Priority::ORDER
            .iter()
            .map(|priority| format!("WHEN '{}' THEN {}", priority.as_str(), priority.rank()))
            .collect();

        format!(
            " ORDER BY CASE book_metrics.priority {} ELSE {} END ASC, \
             book_metrics.followers DESC, books.id ASC",
            cases.join(" "),
            Priority::ORDER.len()
        )
    }

    /// 完整排行查询
    pub fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT {}", RANKED_COLUMNS));
        self.push_source(&mut builder);
        builder.push(self.order_by_sql());
        builder.push(" LIMIT ");
        builder.push_bind(self.limit);
        builder
    }

    /// 满足全部过滤条件的行数，不受 limit 约束
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*)");
        self.push_source(&mut builder);
        builder
    }
}

/// 查询规划器
///
/// 负责把查询上下文转换成 `RankingPlan` 并交给仓储执行
pub struct QueryPlanner<BR: BookRepositoryTrait> {
    book_repo: Arc<BR>,
}

impl<BR: BookRepositoryTrait> QueryPlanner<BR> {
    pub fn new(book_repo: Arc<BR>) -> Self {
        Self { book_repo }
    }

    /// 构建排行计划
    ///
    /// 物化模式下先读取合作出版社列表（一次额外查询），子查询模式不访问存储
    #[instrument(skip(self, ctx), fields(category_id = ctx.category_id()))]
    pub async fn plan(&self, ctx: &QueryContext) -> Result<RankingPlan> {
        let scope = PartnerScope::default();
        let inclusion = match ctx.inclusion_mode() {
            InclusionMode::Subquery => InclusionSet::SubQuery(scope),
            InclusionMode::Materialized => {
                let ids = self.book_repo.list_partner_publisher_ids(scope).await?;
                debug!(partners = ids.len(), "Materialized partner publishers");
                InclusionSet::Materialized(ids)
            }
        };

        Ok(RankingPlan {
            category_id: ctx.category_id(),
            as_of: Utc::now(),
            min_readers: ctx.min_readers(),
            inclusion,
            limit: ctx.limit(),
        })
    }

    /// 执行排行查询
    pub async fn execute(&self, plan: &RankingPlan) -> Result<Vec<RankedBook>> {
        if plan.inclusion.is_empty() {
            debug!("Inclusion set is empty, skipping ranked query");
            return Ok(Vec::new());
        }

        let rows = self.book_repo.fetch_ranked(plan).await?;
        Ok(rows.into_iter().map(RankedBook::from).collect())
    }

    /// 统计满足条件的行数
    pub async fn count(&self, plan: &RankingPlan) -> Result<i64> {
        if plan.inclusion.is_empty() {
            return Ok(0);
        }
        self.book_repo.count_ranked(plan).await
    }
}
