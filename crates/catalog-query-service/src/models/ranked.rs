//! 排行结果定义
//!
//! 排行结果是带标签的和类型：真实书籍或空状态占位记录

use serde::{Deserialize, Serialize};

use super::book::{Book, BookMetrics, RankedRow, Review, User};
use super::category::Category;

/// 排行书籍及其附带的关联数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedBook {
    pub book: Book,
    pub metrics: BookMetrics,
    /// 发布人，对应 book.published_by
    pub publisher: Option<User>,
    /// 责任编辑，对应 book.editor_id
    pub editor: Option<User>,
    /// 所属分类，直接取自查询主体
    pub category: Option<Category>,
    /// 最新评论，条数不超过 related_limit
    pub reviews: Vec<Review>,
}

impl RankedBook {
    pub fn id(&self) -> i64 {
        self.book.id
    }

    /// 外键已设置但关联记录缺失的关系名
    pub fn dangling_relations(&self) -> Vec<&'static str> {
        let mut dangling = Vec::new();
        if self.book.published_by.is_some() && self.publisher.is_none() {
            dangling.push("publisher");
        }
        if self.book.editor_id.is_some() && self.editor.is_none() {
            dangling.push("editor");
        }
        dangling
    }
}

impl From<RankedRow> for RankedBook {
    fn from(row: RankedRow) -> Self {
        Self {
            book: row.book,
            metrics: row.metrics,
            publisher: None,
            editor: None,
            category: None,
            reviews: Vec::new(),
        }
    }
}

/// 空状态占位记录
///
/// 静态策略下由配置合成（无 ID），存储策略下来自 book_placeholders 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub id: Option<i64>,
    pub title: String,
    #[sqlx(default)]
    pub subtitle: Option<String>,
    #[sqlx(default)]
    pub cover_url: Option<String>,
}

/// 排行结果条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankedEntry {
    Book(RankedBook),
    Placeholder(Placeholder),
}

impl RankedEntry {
    /// 真实书籍返回书籍 ID，占位记录返回 None
    pub fn book_id(&self) -> Option<i64> {
        match self {
            Self::Book(ranked) => Some(ranked.id()),
            Self::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn as_book(&self) -> Option<&RankedBook> {
        match self {
            Self::Book(ranked) => Some(ranked),
            Self::Placeholder(_) => None,
        }
    }
}
