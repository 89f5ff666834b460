//! 书目查询领域模型
//!
//! 包含分类、书籍、书籍指标、评论以及排行结果的实体定义

pub mod book;
pub mod category;
pub mod enums;
pub mod ranked;

// 重新导出常用类型
pub use book::{Book, BookMetrics, RankedRow, Review, User};
pub use category::{Category, CategorySubject};
pub use enums::{CategoryKind, Priority};
pub use ranked::{Placeholder, RankedBook, RankedEntry};
