//! 书目查询服务
//!
//! 对外提供三类只读查询：
//!
//! - 分类排行（门槛判定 + ID 缓存 + 有界关联加载 + 空状态）
//! - 分类排行总数（不走缓存）
//! - 分类最新付费书籍（不走缓存）
//!
//! 分类不存在时返回 `QueryError::CategoryNotFound`，其余“查不到”的情况都不是错误。

use std::sync::Arc;

use catalog_shared::cache::CacheStore;
use catalog_shared::config::RankingConfig;
use tracing::instrument;

use crate::error::{QueryError, Result};
use crate::models::{Book, CategorySubject, RankedEntry};
use crate::query::{CategoryBooksQuery, QueryContext, RankedBooksQuery, RankingOptions};
use crate::repository::{BookRepositoryTrait, CategoryRepositoryTrait};

/// 书目查询服务
pub struct CatalogQueryService<CR, BR>
where
    CR: CategoryRepositoryTrait,
    BR: BookRepositoryTrait,
{
    category_repo: Arc<CR>,
    config: RankingConfig,
    ranked: RankedBooksQuery<CR, BR>,
    latest: CategoryBooksQuery<BR>,
}

impl<CR, BR> CatalogQueryService<CR, BR>
where
    CR: CategoryRepositoryTrait,
    BR: BookRepositoryTrait,
{
    pub fn new(
        category_repo: Arc<CR>,
        book_repo: Arc<BR>,
        cache: Arc<dyn CacheStore>,
        config: RankingConfig,
    ) -> Self {
        Self {
            ranked: RankedBooksQuery::new(category_repo.clone(), book_repo.clone(), cache, &config),
            latest: CategoryBooksQuery::new(book_repo, config.latest_books_limit),
            category_repo,
            config,
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// 分类排行
    #[instrument(skip(self, options))]
    pub async fn ranked_books(
        &self,
        category_id: i64,
        options: &RankingOptions,
    ) -> Result<Vec<RankedEntry>> {
        let ctx = self.context(category_id, options).await?;
        self.ranked.get(&ctx).await
    }

    /// 分类排行总数
    #[instrument(skip(self, options))]
    pub async fn count_ranked_books(
        &self,
        category_id: i64,
        options: &RankingOptions,
    ) -> Result<i64> {
        let ctx = self.context(category_id, options).await?;
        self.ranked.count(&ctx).await
    }

    /// 分类最新付费书籍
    #[instrument(skip(self))]
    pub async fn latest_premium_books(
        &self,
        category_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Book>> {
        let category = self
            .category_repo
            .get_category(category_id)
            .await?
            .ok_or(QueryError::CategoryNotFound(category_id))?;

        self.latest.get(&category, limit).await
    }

    async fn context(&self, category_id: i64, options: &RankingOptions) -> Result<QueryContext> {
        let subject: CategorySubject = self
            .category_repo
            .get_subject(category_id)
            .await?
            .ok_or(QueryError::CategoryNotFound(category_id))?;

        QueryContext::new(subject, &self.config, options)
    }
}
