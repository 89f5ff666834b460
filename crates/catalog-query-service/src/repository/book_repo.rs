//! 书籍仓储
//!
//! 排行、评论和最新付费书籍的 SQL 由查询层的计划对象渲染，这里只负责执行

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::traits::BookRepositoryTrait;
use crate::error::Result;
use crate::models::{Book, Placeholder, RankedRow, Review, User};
use crate::query::planner::RANKED_COLUMNS;
use crate::query::{BoundedReviewQuery, PartnerScope, PremiumBooksFilter, RankingPlan};

pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 排行 ====================

    #[instrument(skip(self, plan), fields(category_id = plan.category_id, limit = plan.limit))]
    pub async fn fetch_ranked(&self, plan: &RankingPlan) -> Result<Vec<RankedRow>> {
        let rows = plan
            .select_query()
            .build_query_as::<RankedRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn count_ranked(&self, plan: &RankingPlan) -> Result<i64> {
        let count = plan
            .count_query()
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// 按 ID 批量读取排行行，不做可见性过滤，返回顺序不保证
    pub async fn get_ranked_by_ids(&self, ids: &[i64]) -> Result<Vec<RankedRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM books \
             INNER JOIN book_metrics ON book_metrics.book_id = books.id \
             WHERE books.id = ANY($1)",
            RANKED_COLUMNS
        );
        let rows = sqlx::query_as::<_, RankedRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn list_partner_publisher_ids(&self, scope: PartnerScope) -> Result<Vec<i64>> {
        let ids = scope
            .select_query()
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    // ==================== 关联数据 ====================

    pub async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// 每本书最多 K 条最新评论，一次往返
    #[instrument(skip(self, query), fields(books = query.book_ids.len(), per_book = query.per_book_limit))]
    pub async fn fetch_bounded_reviews(&self, query: &BoundedReviewQuery) -> Result<Vec<Review>> {
        let Some(mut builder) = query.build() else {
            return Ok(Vec::new());
        };

        let reviews = builder
            .build_query_as::<Review>()
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    // ==================== 空状态 ====================

    /// 分类专属占位记录在前，全局占位记录（category_id 为空）在后
    pub async fn list_placeholders(&self, category_id: i64) -> Result<Vec<Placeholder>> {
        let placeholders = sqlx::query_as::<_, Placeholder>(
            r#"
            SELECT id, title, subtitle, cover_url
            FROM book_placeholders
            WHERE category_id = $1 OR category_id IS NULL
            ORDER BY (category_id IS NULL) ASC, sort_order ASC, id ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(placeholders)
    }

    // ==================== 最新付费书籍 ====================

    pub async fn list_premium_books(&self, filter: &PremiumBooksFilter) -> Result<Vec<Book>> {
        let books = filter
            .select_query()
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn fetch_ranked(&self, plan: &RankingPlan) -> Result<Vec<RankedRow>> {
        self.fetch_ranked(plan).await
    }

    async fn count_ranked(&self, plan: &RankingPlan) -> Result<i64> {
        self.count_ranked(plan).await
    }

    async fn get_ranked_by_ids(&self, ids: &[i64]) -> Result<Vec<RankedRow>> {
        self.get_ranked_by_ids(ids).await
    }

    async fn list_partner_publisher_ids(&self, scope: PartnerScope) -> Result<Vec<i64>> {
        self.list_partner_publisher_ids(scope).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids(ids).await
    }

    async fn fetch_bounded_reviews(&self, query: &BoundedReviewQuery) -> Result<Vec<Review>> {
        self.fetch_bounded_reviews(query).await
    }

    async fn list_placeholders(&self, category_id: i64) -> Result<Vec<Placeholder>> {
        self.list_placeholders(category_id).await
    }

    async fn list_premium_books(&self, filter: &PremiumBooksFilter) -> Result<Vec<Book>> {
        self.list_premium_books(filter).await
    }
}
