//! 对象缓存层
//!
//! 以字符串形式存储序列化后的对象，后端通过插件注册表按名称选择（moka / redis）。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

/// 缓存读取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    // 后端出错，视为未命中
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` 为 0 时使用后端默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// 读取并反序列化缓存对象
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ObjectCache, key: &str) -> Option<T> {
    match cache.get_raw(key).await {
        CacheResult::Found(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to decode cached value for '{}': {}", key, e);
                cache.remove(key).await;
                None
            }
        },
        CacheResult::NotFound | CacheResult::ExistsButNoValue => None,
    }
}

/// 序列化并写入缓存对象
pub async fn insert_json<T: Serialize>(cache: &dyn ObjectCache, key: &str, value: &T, ttl: u64) {
    match serde_json::to_string(value) {
        Ok(raw) => cache.insert_raw(key.to_string(), raw, ttl).await,
        Err(e) => warn!("Failed to encode value for cache key '{}': {}", key, e),
    }
}

/// 声明对象缓存插件，生成 `register_plugin()` 注册函数
///
/// 类型需提供 `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $ty:ty) => {
        pub fn register_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new()
                            .map_err($crate::errors::GradingError::cache_connection)?;
                        Ok::<Box<dyn $crate::cache::ObjectCache>, $crate::errors::GradingError>(
                            Box::new(cache),
                        )
                    }) as $crate::cache::register::BoxedObjectCacheFuture
                }),
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::object_cache::moka::MokaCacheWrapper;
    use super::*;

    #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
    struct Snapshot {
        total: i64,
        label: String,
    }

    #[tokio::test]
    async fn test_json_round_trip_and_invalidate() {
        let cache = MokaCacheWrapper::with_settings(100, 60);
        let value = Snapshot {
            total: 3,
            label: "90-100".to_string(),
        };

        insert_json(&cache, "snapshot", &value, 0).await;
        assert_eq!(get_json::<Snapshot>(&cache, "snapshot").await, Some(value));

        cache.invalidate_all().await;
        assert_eq!(get_json::<Snapshot>(&cache, "snapshot").await, None);
    }

    #[tokio::test]
    async fn test_undecodable_value_is_dropped() {
        let cache = MokaCacheWrapper::with_settings(100, 60);
        cache
            .insert_raw("broken".to_string(), "{not json".to_string(), 0)
            .await;

        assert_eq!(get_json::<Snapshot>(&cache, "broken").await, None);
        assert_eq!(cache.get_raw("broken").await, CacheResult::NotFound);
    }
}
