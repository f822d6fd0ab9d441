use crate::cache::ObjectCache;
use crate::cache::register::{open_cache, register_builtin_plugins, registered_backends};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::GradingEngine;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 内存缓存总能构造成功，作为兜底后端
const FALLBACK_CACHE: &str = "moka";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub engine: Arc<GradingEngine>,
}

/// 打开配置的缓存后端；失败时回退到内存缓存
async fn create_cache(config: &AppConfig) -> Result<Arc<dyn ObjectCache>> {
    let wanted = config.cache.cache_type.as_str();

    match open_cache(wanted).await {
        Ok(cache) => {
            info!("Cache backend '{}' ready", wanted);
            Ok(cache)
        }
        Err(e) if wanted != FALLBACK_CACHE => {
            warn!("Cache backend '{}' unavailable ({}), using {}", wanted, e, FALLBACK_CACHE);
            open_cache(FALLBACK_CACHE).await
        }
        Err(e) => Err(e),
    }
}

/// 组装存储、缓存和批改引擎
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装只会返回 Err，进程内已有 provider 即可
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    register_builtin_plugins();
    debug!("Cache backends registered: {:?}", registered_backends());

    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    info!("Storage initialized and migrated");

    let cache = create_cache(config).await?;

    let grading = config.grading.clone();
    warn!(
        "Grading engine ready: step {:?}, score {:?}, keep {} jobs per assignment",
        grading.step_range(),
        grading.score_range(),
        grading.max_jobs_per_assignment
    );
    let engine = Arc::new(GradingEngine::new(storage.clone(), grading));

    Ok(StartupContext {
        storage,
        cache,
        engine,
    })
}
