//! 分类最新付费书籍
//!
//! 简单的 过滤 -> 排序 -> 限制 查询，不走缓存，也不附加关联数据

use std::sync::Arc;

use sqlx::{Postgres, QueryBuilder};
use tracing::instrument;

use crate::error::{QueryError, Result};
use crate::models::{Book, Category};
use crate::repository::BookRepositoryTrait;

const BOOK_COLUMNS: &str = "id, title, category_id, user_id, publisher_id, published_by, \
     editor_id, is_premium, published_at, created_at, updated_at";

/// 最新付费书籍查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumBooksFilter {
    pub category_id: i64,
    /// 归档分类只返回无主书籍
    pub orphaned_only: bool,
    pub limit: i64,
}

impl PremiumBooksFilter {
    pub fn for_category(category: &Category, limit: i64) -> Self {
        Self {
            category_id: category.id,
            orphaned_only: category.is_archived(),
            limit,
        }
    }

    /// 过滤先于排序和限制生效
    pub fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM books", BOOK_COLUMNS));
        builder.push(" WHERE category_id = ");
        builder.push_bind(self.category_id);
        builder.push(" AND published_at IS NOT NULL AND is_premium = TRUE");
        if self.orphaned_only {
            builder.push(" AND user_id IS NULL");
        }
        builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        builder.push_bind(self.limit);
        builder
    }
}

pub struct CategoryBooksQuery<BR: BookRepositoryTrait> {
    book_repo: Arc<BR>,
    default_limit: i64,
}

impl<BR: BookRepositoryTrait> CategoryBooksQuery<BR> {
    pub fn new(book_repo: Arc<BR>, default_limit: i64) -> Self {
        Self {
            book_repo,
            default_limit,
        }
    }

    /// 分类下已发布的付费书籍，按创建时间倒序
    #[instrument(skip(self, category), fields(category_id = category.id, archived = category.is_archived()))]
    pub async fn get(&self, category: &Category, limit: Option<i64>) -> Result<Vec<Book>> {
        let limit = limit.unwrap_or(self.default_limit);
        if limit <= 0 {
            return Err(QueryError::Validation(format!(
                "limit must be positive, got {}",
                limit
            )));
        }

        let filter = PremiumBooksFilter::for_category(category, limit);
        self.book_repo.list_premium_books(&filter).await
    }
}
