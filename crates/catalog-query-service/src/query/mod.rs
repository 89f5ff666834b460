//! 查询管线
//!
//! - `context`: 单次调用的参数与门槛值
//! - `criteria`: 门槛判定
//! - `planner`: 排行查询规划与执行
//! - `result_cache`: ID 列表缓存
//! - `loader`: 有界关联加载
//! - `validator`: 悬空关联剔除
//! - `empty_state`: 空结果替换
//! - `ranked_books`: 以上组件组成的排行管线
//! - `category_books`: 分类最新付费书籍

pub mod category_books;
pub mod context;
pub mod criteria;
pub mod empty_state;
pub mod loader;
pub mod planner;
pub mod ranked_books;
pub mod result_cache;
pub mod validator;

pub use category_books::{CategoryBooksQuery, PremiumBooksFilter};
pub use context::{QueryContext, RankingOptions};
pub use criteria::CriteriaGate;
pub use empty_state::EmptyStateProvider;
pub use loader::{BoundedRelatedLoader, BoundedReviewQuery};
pub use planner::{InclusionSet, PartnerScope, QueryPlanner, RankingPlan};
pub use ranked_books::{RankedBooksQuery, ShortCircuit};
pub use result_cache::{FetchSource, ResultCache};
pub use validator::ResultValidator;
