//! 书目查询服务
//!
//! 按分类提供带门槛判定与结果缓存的书籍排行，以及分类最新付费书籍查询。
//!
//! ## 模块结构
//!
//! - `models`: 实体与排行结果
//! - `repository`: 仓储接口与 PostgreSQL 实现
//! - `query`: 排行管线各组件
//! - `service`: 对外查询服务
//! - `cli`: 命令行参数定义

pub mod cli;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{QueryError, Result};
pub use query::{QueryContext, RankingOptions};
pub use service::CatalogQueryService;
