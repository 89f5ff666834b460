//! 缓存存储模块
//!
//! 定义带 TTL 语义的键值存储接口 `CacheStore`，并提供两种实现：
//!
//! - `Cache`: 基于 Redis，多进程共享
//! - `MemoryCache`: 基于 DashMap，进程内使用（本地运行与测试）
//!
//! 存储的值是不透明字节，编码方式由调用方决定。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{info, instrument};

use crate::config::RedisConfig;
use crate::error::{CatalogError, Result};

/// 带 TTL 的键值存储接口
///
/// 写入是整值替换，并发写同一个 key 时后写者生效，不会出现部分写入
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;
}

/// Redis 实现，多个进程共享同一份排行缓存
#[derive(Clone)]
pub struct Cache {
    client: Client,
    connect_timeout: Duration,
}

impl Cache {
    /// 只解析 URL，不建立连接
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!(timeout_ms = config.connect_timeout_ms, "Redis cache configured");
        Ok(Self {
            client,
            connect_timeout: config.connect_timeout(),
        })
    }

    /// 建连超时转换成 IO 类 RedisError，与连接被拒同样对待
    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        match tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        {
            Ok(conn) => Ok(conn?),
            Err(_) => Err(CatalogError::Redis(redis::RedisError::from(
                std::io::Error::new(std::io::ErrorKind::TimedOut, "redis connect timed out"),
            ))),
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(CatalogError::from)
    }
}

#[async_trait]
impl CacheStore for Cache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.get_conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    /// 基于 SET EX 写入，Redis 不接受 0 秒过期，至少保留 1 秒
    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }
}

struct MemoryEntry {
    value: Vec<u8>,
    /// `None` 表示 TTL 超出 Instant 可表示范围，永不过期
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// 进程内缓存
///
/// 过期条目在读取时惰性清理
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前条目数（含尚未被清理的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        // 读锁已释放后再删除，避免 DashMap 同分片死锁
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }
}
