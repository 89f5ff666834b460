//! 分类实体定义
//!
//! 分类是排行查询的主体（subject），所有查询都限定在一个分类内

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::book::User;
use super::enums::CategoryKind;

/// 书籍分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    /// 分类名称
    pub label: String,
    /// 分类类型
    pub kind: CategoryKind,
    /// 是否已归档
    pub is_archived: bool,
    /// 分类责任编辑，设置后该分类下所有书籍共享同一编辑
    #[sqlx(default)]
    pub editor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn is_restricted(&self) -> bool {
        self.kind == CategoryKind::Restricted
    }
}

/// 查询主体
///
/// 分类连同其已加载的责任编辑，一次查询取出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySubject {
    pub category: Category,
    /// 分类设置了 editor_id 且编辑存在时为 Some
    pub editor: Option<User>,
}

impl CategorySubject {
    pub fn new(category: Category, editor: Option<User>) -> Self {
        Self { category, editor }
    }

    pub fn id(&self) -> i64 {
        self.category.id
    }
}
