//! Redis 缓存后端，多实例部署时共享统计快照

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tracing::{debug, error, info};

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("redis", RedisObjectCache);

/// 每轮 SCAN 建议返回的键数量
const SCAN_BATCH: usize = 200;

pub struct RedisObjectCache {
    client: redis::Client,
    namespace: String,
    default_ttl_secs: u64,
}

impl RedisObjectCache {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        let url = &config.cache.redis.url;

        let client =
            redis::Client::open(url.as_str()).map_err(|e| format!("Invalid Redis URL '{url}': {e}"))?;

        // 同步 PING 一次，连不上就让启动流程回退到 moka
        let pong: String = client
            .get_connection()
            .and_then(|mut conn| redis::cmd("PING").query(&mut conn))
            .map_err(|e| format!("Redis at '{url}' is unreachable: {e}"))?;

        info!(
            "Redis cache ready (namespace '{}', default TTL {}s, PING -> {})",
            config.cache.redis.key_prefix, config.cache.default_ttl, pong
        );

        Ok(Self {
            client,
            namespace: config.cache.redis.key_prefix.clone(),
            default_ttl_secs: config.cache.default_ttl,
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    /// 取一个多路复用连接；失败时记录日志并返回 None
    async fn connection(&self) -> Option<MultiplexedConnection> {
        match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                error!("Redis connection unavailable: {}", e);
                None
            }
        }
    }

    /// 游标遍历命名空间下的所有键，避免 KEYS 阻塞服务端
    async fn scan_namespace(&self, conn: &mut MultiplexedConnection) -> redis::RedisResult<Vec<String>> {
        let pattern = format!("{}*", self.namespace);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }
}

#[async_trait]
impl ObjectCache for RedisObjectCache {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        let Some(mut conn) = self.connection().await else {
            return CacheResult::ExistsButNoValue;
        };

        match conn.get::<_, Option<String>>(self.namespaced(key)).await {
            Ok(Some(payload)) => CacheResult::Found(payload),
            Ok(None) => {
                debug!("Redis miss: {}", key);
                CacheResult::NotFound
            }
            Err(e) => {
                error!("Redis GET '{}' failed: {}", key, e);
                CacheResult::ExistsButNoValue
            }
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        let Some(mut conn) = self.connection().await else {
            return;
        };

        let ttl = if ttl == 0 { self.default_ttl_secs } else { ttl };
        if let Err(e) = conn
            .set_ex::<_, _, ()>(self.namespaced(&key), value, ttl)
            .await
        {
            error!("Redis SETEX '{}' failed: {}", key, e);
        }
    }

    async fn remove(&self, key: &str) {
        let Some(mut conn) = self.connection().await else {
            return;
        };

        if let Err(e) = conn.del::<_, i64>(self.namespaced(key)).await {
            error!("Redis DEL '{}' failed: {}", key, e);
        }
    }

    async fn invalidate_all(&self) {
        let Some(mut conn) = self.connection().await else {
            return;
        };

        let keys = match self.scan_namespace(&mut conn).await {
            Ok(keys) if keys.is_empty() => return,
            Ok(keys) => keys,
            Err(e) => {
                error!("Redis SCAN over '{}*' failed: {}", self.namespace, e);
                return;
            }
        };

        match conn.del::<_, i64>(keys).await {
            Ok(removed) => debug!("Dropped {} cached snapshots", removed),
            Err(e) => error!("Redis bulk DEL failed: {}", e),
        }
    }
}
