//! 命令行定义
//!
//! ```bash
//! # 分类排行
//! catalog-query ranked -c 3 --limit 5
//!
//! # 排行总数
//! catalog-query count -c 3
//!
//! # 最新付费书籍
//! catalog-query latest -c 3 --limit 5
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::query::RankingOptions;

/// 书目查询命令行工具
#[derive(Parser, Debug)]
#[command(name = "catalog-query")]
#[command(version, about = "书目排行查询工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 缓存后端
    #[arg(long, value_enum, default_value = "redis")]
    pub cache: CacheBackend,

    /// 输出格式化后的 JSON
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    Redis,
    /// 进程内缓存，仅在单次运行内有效
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 分类排行
    Ranked {
        /// 分类 ID
        #[arg(short, long)]
        category: i64,

        #[command(flatten)]
        options: RankingArgs,
    },

    /// 满足排行条件的书籍总数
    Count {
        #[arg(short, long)]
        category: i64,

        #[command(flatten)]
        options: RankingArgs,
    },

    /// 分类最新付费书籍
    Latest {
        #[arg(short, long)]
        category: i64,

        /// 条数，默认取配置 latest_books_limit
        #[arg(short, long)]
        limit: Option<i64>,
    },
}

/// 排行参数覆盖，未指定时使用配置值
#[derive(Args, Debug, Clone, Default)]
pub struct RankingArgs {
    #[arg(long)]
    pub threshold: Option<i64>,

    #[arg(long)]
    pub limit: Option<i64>,

    #[arg(long)]
    pub related_limit: Option<i64>,

    #[arg(long)]
    pub min_readers: Option<i64>,
}

impl From<RankingArgs> for RankingOptions {
    fn from(args: RankingArgs) -> Self {
        RankingOptions {
            threshold: args.threshold,
            limit: args.limit,
            related_limit: args.related_limit,
            min_readers: args.min_readers,
            cache_ttl: None,
        }
    }
}
