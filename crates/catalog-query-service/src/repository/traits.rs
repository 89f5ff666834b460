//! 仓储 Trait 定义
//!
//! 查询管线只依赖这些接口，便于替换成 mock 或内存实现

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Book, Category, CategorySubject, Placeholder, RankedRow, Review, User};
use crate::query::{BoundedReviewQuery, PartnerScope, PremiumBooksFilter, RankingPlan};

/// 分类仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    async fn get_category(&self, id: i64) -> Result<Option<Category>>;

    /// 分类连同责任编辑一次取出
    async fn get_subject(&self, id: i64) -> Result<Option<CategorySubject>>;

    /// 分类互动积分总和，没有记录时为 0
    async fn sum_engagement_points(&self, category_id: i64) -> Result<i64>;
}

/// 书籍仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepositoryTrait: Send + Sync {
    // 排行
    async fn fetch_ranked(&self, plan: &RankingPlan) -> Result<Vec<RankedRow>>;
    async fn count_ranked(&self, plan: &RankingPlan) -> Result<i64>;
    async fn get_ranked_by_ids(&self, ids: &[i64]) -> Result<Vec<RankedRow>>;
    async fn list_partner_publisher_ids(&self, scope: PartnerScope) -> Result<Vec<i64>>;

    // 关联数据
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    async fn fetch_bounded_reviews(&self, query: &BoundedReviewQuery) -> Result<Vec<Review>>;

    // 空状态
    async fn list_placeholders(&self, category_id: i64) -> Result<Vec<Placeholder>>;

    // 最新付费书籍
    async fn list_premium_books(&self, filter: &PremiumBooksFilter) -> Result<Vec<Book>>;
}
