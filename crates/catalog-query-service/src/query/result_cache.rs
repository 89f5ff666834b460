//! 排行结果缓存
//!
//! 只缓存有序的书籍 ID 列表（JSON 整数数组），不缓存记录本身。
//! 命中后按 ID 重新读取记录，因此非 ID 字段的变更在 TTL 内也能立即可见，
//! 已删除或不再可读的 ID 被静默丢弃。

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use catalog_shared::cache::CacheStore;
use catalog_shared::observability::metrics;
use tracing::{debug, instrument, warn};

use super::context::QueryContext;
use crate::error::Result;
use crate::models::RankedBook;
use crate::repository::BookRepositoryTrait;

/// 管线版本标记，缓存值语义变化时递增
pub const CACHE_VERSION: u32 = 1;

/// 缓存 key 前缀
pub const CACHE_KEY_PREFIX: &str = "catalog:ranked-books";

/// 缓存 key
///
/// 只纳入影响 ID 列表的参数（条数、读者数、纳入来源）；门槛只决定是否进入管线，
/// 评论条数在命中后重新加载，两者都不影响缓存值
pub fn cache_key(ctx: &QueryContext) -> String {
    format!(
        "{}:{}:v{}:l{}-m{}-{}",
        CACHE_KEY_PREFIX,
        ctx.category_id(),
        CACHE_VERSION,
        ctx.limit(),
        ctx.min_readers(),
        ctx.inclusion_mode().as_str()
    )
}

pub fn encode_ids(ids: &[i64]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(ids)?)
}

pub fn decode_ids(bytes: &[u8]) -> std::result::Result<Vec<i64>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// 缓存命中，记录按缓存 ID 重新读取，尚未附加关联数据
    Cache,
    /// 缓存未命中，由调用方计算得到
    Computed,
}

#[derive(Debug)]
pub struct Fetched {
    pub records: Vec<RankedBook>,
    pub source: FetchSource,
}

pub struct ResultCache<BR: BookRepositoryTrait> {
    book_repo: Arc<BR>,
    store: Arc<dyn CacheStore>,
}

impl<BR: BookRepositoryTrait> ResultCache<BR> {
    pub fn new(book_repo: Arc<BR>, store: Arc<dyn CacheStore>) -> Self {
        Self { book_repo, store }
    }

    /// 读取缓存，未命中时执行 `compute` 并写入非空结果
    #[instrument(skip(self, ctx, compute), fields(category_id = ctx.category_id()))]
    pub async fn fetch<F, Fut>(&self, ctx: &QueryContext, compute: F) -> Result<Fetched>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<RankedBook>>>,
    {
        let key = cache_key(ctx);

        if let Some(ids) = self.read_ids(&key).await? {
            debug!(key = %key, count = ids.len(), "Ranked ids cache hit");
            metrics::record_cache_lookup(true);
            let records = self.load_in_order(&ids).await?;
            return Ok(Fetched {
                records,
                source: FetchSource::Cache,
            });
        }

        debug!(key = %key, "Ranked ids cache miss");
        metrics::record_cache_lookup(false);

        let records = compute().await?;
        if records.is_empty() {
            debug!(key = %key, "Computed result is empty, not caching");
        } else {
            let ids: Vec<i64> = records.iter().map(RankedBook::id).collect();
            self.store
                .put(&key, &encode_ids(&ids)?, ctx.cache_ttl())
                .await?;
        }

        Ok(Fetched {
            records,
            source: FetchSource::Computed,
        })
    }

    /// 无法解码或为空的缓存值按未命中处理
    async fn read_ids(&self, key: &str) -> Result<Option<Vec<i64>>> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };

        match decode_ids(&bytes) {
            Ok(ids) if !ids.is_empty() => Ok(Some(ids)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(key = %key, error = %e, "Undecodable ranked ids payload, treating as miss");
                Ok(None)
            }
        }
    }

    /// 按 ID 批量读取并恢复缓存中的顺序
    async fn load_in_order(&self, ids: &[i64]) -> Result<Vec<RankedBook>> {
        let rows = self.book_repo.get_ranked_by_ids(ids).await?;
        let mut by_id: HashMap<i64, RankedBook> = rows
            .into_iter()
            .map(|row| (row.book.id, RankedBook::from(row)))
            .collect();

        let records: Vec<RankedBook> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        if records.len() < ids.len() {
            debug!(
                cached = ids.len(),
                resolved = records.len(),
                "Dropped stale cached ids"
            );
        }
        Ok(records)
    }
}
