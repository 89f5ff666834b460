//! 书籍相关实体定义
//!
//! 包含书籍本体、书籍指标（排行依据）、评论和用户

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Priority;

/// 书籍
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// 所属分类 ID
    pub category_id: i64,
    /// 持有用户，为空表示无主书籍
    #[sqlx(default)]
    pub user_id: Option<i64>,
    /// 出版社 ID，排行时按合作出版社过滤
    pub publisher_id: i64,
    /// 发布人（用户 ID）
    #[sqlx(default)]
    pub published_by: Option<i64>,
    /// 责任编辑（用户 ID）
    #[sqlx(default)]
    pub editor_id: Option<i64>,
    pub is_premium: bool,
    #[sqlx(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    /// 发布时间已设置且不晚于 `now`
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|at| at <= now)
    }

    /// 没有持有用户
    pub fn is_orphaned(&self) -> bool {
        self.user_id.is_none()
    }
}

/// 书籍指标
///
/// 来自 book_metrics 表，与书籍一对一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookMetrics {
    pub priority: Priority,
    pub followers: i64,
    pub readers: i64,
}

/// 排行查询返回的行：书籍列 + 指标列
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RankedRow {
    #[sqlx(flatten)]
    pub book: Book,
    #[sqlx(flatten)]
    pub metrics: BookMetrics,
}

/// 书籍评论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub reviewer_name: String,
    pub rating: i16,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// 用户（只取展示所需的列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
}
