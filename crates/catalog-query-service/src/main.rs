//! 书目查询命令行入口
//!
//! 加载配置、初始化可观测性与存储连接后执行单条查询，结果以 JSON 输出到标准输出。

use std::sync::Arc;

use anyhow::Result;
use catalog_shared::cache::{Cache, CacheStore, MemoryCache};
use catalog_shared::config::AppConfig;
use catalog_shared::database::Database;
use catalog_shared::observability;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use catalog_query::cli::{CacheBackend, Cli, Commands};
use catalog_query::repository::{BookRepository, CategoryRepository};
use catalog_query::service::CatalogQueryService;

const SERVICE_NAME: &str = "catalog-query-service";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 1. 加载配置
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 2. 可观测性（日志输出到 stderr，stdout 只留给查询结果）
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(environment = %config.environment, "Configuration loaded");

    // 3. 存储
    let db = Database::connect(&config.database).await?;
    let cache: Arc<dyn CacheStore> = match cli.cache {
        CacheBackend::Redis => {
            let cache = Cache::new(&config.redis)?;
            cache.health_check().await?;
            Arc::new(cache)
        }
        CacheBackend::Memory => {
            if config.is_production() {
                warn!("In-memory cache is not shared across processes");
            }
            Arc::new(MemoryCache::new())
        }
    };

    let service = CatalogQueryService::new(
        Arc::new(CategoryRepository::new(db.pool().clone())),
        Arc::new(BookRepository::new(db.pool().clone())),
        cache,
        config.ranking.clone(),
    );

    // 4. 执行查询
    let output = match cli.command {
        Commands::Ranked { category, options } => {
            let entries = service.ranked_books(category, &options.into()).await?;
            render(&entries, cli.pretty)?
        }
        Commands::Count { category, options } => {
            let count = service.count_ranked_books(category, &options.into()).await?;
            render(&serde_json::json!({ "categoryId": category, "count": count }), cli.pretty)?
        }
        Commands::Latest { category, limit } => {
            let books = service.latest_premium_books(category, limit).await?;
            render(&books, cli.pretty)?
        }
    };

    println!("{}", output);

    db.close().await;
    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
