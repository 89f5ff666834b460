//! 服务层
//!
//! 负责加载查询主体、构建查询上下文并调用查询管线

pub mod query_service;

pub use query_service::CatalogQueryService;
