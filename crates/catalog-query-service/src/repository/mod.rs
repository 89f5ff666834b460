//! 数据库仓储层
//!
//! 仓储只负责执行 SQL 并映射结果，查询的形状（过滤、排序、UNION）由查询层的
//! 计划对象描述，仓储不做业务判断。

mod book_repo;
mod category_repo;
mod traits;

pub use book_repo::BookRepository;
pub use category_repo::CategoryRepository;
pub use traits::*;
