//! 缓存后端注册表，按配置里的 `cache.type` 名称构造后端

use crate::cache::ObjectCache;
use crate::errors::{GradingError, Result};
use once_cell::sync::Lazy;
use std::{
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    sync::{Arc, Once, RwLock, RwLockReadGuard},
};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

static BACKENDS: Lazy<RwLock<BTreeMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(BTreeMap::new()));

static BUILTIN_PLUGINS: Once = Once::new();

// 构造函数不会在持锁时 panic，中毒的锁内容仍然可用
fn backends() -> RwLockReadGuard<'static, BTreeMap<String, ObjectCacheConstructor>> {
    BACKENDS.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn register_object_cache_plugin(name: impl Into<String>, constructor: ObjectCacheConstructor) {
    BACKENDS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(name.into(), constructor);
}

/// 注册内置后端（moka、redis），重复调用无副作用
pub fn register_builtin_plugins() {
    BUILTIN_PLUGINS.call_once(|| {
        crate::cache::object_cache::moka::register_plugin();
        crate::cache::object_cache::redis::register_plugin();
    });
}

/// 已注册的后端名称，按字母序
pub fn registered_backends() -> Vec<String> {
    backends().keys().cloned().collect()
}

/// 构造指定名称的缓存后端
pub async fn open_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let found = backends().get(name).cloned();
    let Some(constructor) = found else {
        return Err(GradingError::cache_plugin_not_found(format!(
            "未知的缓存后端 '{name}'，可用: {:?}",
            registered_backends()
        )));
    };
    constructor().await.map(Arc::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_plugins_are_registered() {
        register_builtin_plugins();
        register_builtin_plugins();
        let names = registered_backends();
        assert!(names.contains(&"moka".to_string()));
        assert!(names.contains(&"redis".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_backend_is_reported() {
        register_builtin_plugins();
        let err = match open_cache("memcached").await {
            Ok(_) => panic!("memcached should not be registered"),
            Err(e) => e,
        };
        assert_eq!(err.code(), "E002");
        assert!(err.message().contains("moka"));
    }
}
