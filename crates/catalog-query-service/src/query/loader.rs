//! 关联数据加载
//!
//! 为一批排行书籍附加关联数据：
//!
//! - publisher: 按 published_by 批量加载
//! - category: 直接取自查询主体，不访问存储
//! - reviews: 每本书最多 K 条最新评论，单条 UNION ALL 语句取回，总行数不超过 n*K
//! - editor: 主体已带编辑时直接赋值，否则按 editor_id 批量加载
//!
//! 所有加载都以整批书籍为单位，查询次数与书籍数量无关。

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::models::{CategorySubject, RankedBook, Review, User};
use crate::repository::BookRepositoryTrait;

const REVIEW_COLUMNS: &str = "id, book_id, reviewer_name, rating, body, created_at";

/// 有界评论查询
///
/// 每个父记录渲染成一个带 LIMIT 的子查询，再以 UNION ALL 合并，
/// 数据库对每个子查询单独应用条数限制
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedReviewQuery {
    pub book_ids: Vec<i64>,
    pub per_book_limit: i64,
}

impl BoundedReviewQuery {
    pub fn new(book_ids: Vec<i64>, per_book_limit: i64) -> Self {
        Self {
            book_ids,
            per_book_limit,
        }
    }

    /// 没有父记录或限制为 0 时无需查询
    pub fn is_noop(&self) -> bool {
        self.book_ids.is_empty() || self.per_book_limit <= 0
    }

    /// 可能返回的最大行数，超出 usize 时取 usize::MAX
    pub fn max_rows(&self) -> usize {
        if self.is_noop() {
            return 0;
        }
        let per_book = usize::try_from(self.per_book_limit).unwrap_or(usize::MAX);
        self.book_ids.len().saturating_mul(per_book)
    }

    /// 渲染 UNION ALL 查询，`is_noop()` 时返回 None
    pub fn build(&self) -> Option<QueryBuilder<'static, Postgres>> {
        if self.is_noop() {
            return None;
        }

        let mut builder = QueryBuilder::new("");
        for (index, book_id) in self.book_ids.iter().enumerate() {
            if index > 0 {
                builder.push(" UNION ALL ");
            }
            builder.push(format!(
                "(SELECT {} FROM book_reviews WHERE book_id = ",
                REVIEW_COLUMNS
            ));
            builder.push_bind(*book_id);
            builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
            builder.push_bind(self.per_book_limit);
            builder.push(")");
        }
        Some(builder)
    }
}

/// 有界关联加载器
pub struct BoundedRelatedLoader<BR: BookRepositoryTrait> {
    book_repo: Arc<BR>,
}

impl<BR: BookRepositoryTrait> BoundedRelatedLoader<BR> {
    pub fn new(book_repo: Arc<BR>) -> Self {
        Self { book_repo }
    }

    /// 为整批书籍附加关联数据，空批次不发起任何查询
    #[instrument(skip(self, records, subject), fields(count = records.len(), category_id = subject.id()))]
    pub async fn attach(
        &self,
        records: &mut [RankedBook],
        subject: &CategorySubject,
        related_limit: i64,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.attach_publishers(records).await?;

        for record in records.iter_mut() {
            record.category = Some(subject.category.clone());
        }

        self.attach_reviews(records, related_limit).await?;
        self.attach_editors(records, subject).await?;

        Ok(())
    }

    async fn attach_publishers(&self, records: &mut [RankedBook]) -> Result<()> {
        let ids = distinct_ids(records.iter().filter_map(|r| r.book.published_by));
        let users = self.load_users(&ids).await?;

        for record in records.iter_mut() {
            record.publisher = record
                .book
                .published_by
                .and_then(|id| users.get(&id).cloned());
        }
        Ok(())
    }

    async fn attach_reviews(&self, records: &mut [RankedBook], related_limit: i64) -> Result<()> {
        let query = BoundedReviewQuery::new(
            records.iter().map(RankedBook::id).collect(),
            related_limit,
        );

        let reviews = if query.is_noop() {
            Vec::new()
        } else {
            self.book_repo.fetch_bounded_reviews(&query).await?
        };
        debug!(
            rows = reviews.len(),
            max_rows = query.max_rows(),
            "Loaded bounded reviews"
        );

        let mut grouped = partition_reviews(reviews, related_limit);
        for record in records.iter_mut() {
            record.reviews = grouped.remove(&record.id()).unwrap_or_default();
        }
        Ok(())
    }

    async fn attach_editors(
        &self,
        records: &mut [RankedBook],
        subject: &CategorySubject,
    ) -> Result<()> {
        // 主体已带编辑：同分类书籍共享同一编辑，无需查询
        if let Some(editor) = &subject.editor {
            for record in records.iter_mut() {
                record.editor = Some(editor.clone());
            }
            return Ok(());
        }

        let ids = distinct_ids(records.iter().filter_map(|r| r.book.editor_id));
        let users = self.load_users(&ids).await?;

        for record in records.iter_mut() {
            record.editor = record.book.editor_id.and_then(|id| users.get(&id).cloned());
        }
        Ok(())
    }

    async fn load_users(&self, ids: &[i64]) -> Result<HashMap<i64, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.book_repo.get_users_by_ids(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

fn distinct_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// 按书籍分组，组内按时间倒序并截断到上限
///
/// UNION ALL 的结果整体顺序不确定，这里重新排序；截断保证存储端行为异常时上限依旧成立
fn partition_reviews(reviews: Vec<Review>, limit: i64) -> HashMap<i64, Vec<Review>> {
    let mut grouped: HashMap<i64, Vec<Review>> = HashMap::new();
    for review in reviews {
        grouped.entry(review.book_id).or_default().push(review);
    }

    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    for group in grouped.values_mut() {
        group.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        group.truncate(limit);
    }
    grouped
}
