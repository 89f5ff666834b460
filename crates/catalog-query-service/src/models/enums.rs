//! 书目枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 书籍推荐优先级
///
/// 存储在 book_metrics.priority 中，排行时按 `Priority::ORDER` 的显式全序排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// 排行使用的显式全序，靠前者优先
    pub const ORDER: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// 数据库中的存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// 在 `ORDER` 中的位置
    pub fn rank(&self) -> usize {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// 分类类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum CategoryKind {
    /// 普通分类
    #[default]
    Standard,
    /// 受限分类 - 不参与排行
    Restricted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_is_total() {
        let ranks: Vec<usize> = Priority::ORDER.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(Priority::High.as_str(), "high");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"LOW\"");
    }

    #[test]
    fn test_category_kind_default() {
        assert_eq!(CategoryKind::default(), CategoryKind::Standard);
    }
}
