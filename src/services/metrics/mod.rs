pub mod compute;
pub mod get;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::cache::ObjectCache;
use crate::errors::Result;
use crate::models::metrics::requests::{MetricsFilter, MetricsParams};
use crate::models::metrics::responses::Metrics;
use crate::storage::Storage;

pub use compute::{MetricsInput, compute_metrics};

pub struct MetricsService;

impl MetricsService {
    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::injected(request)
    }

    // 获取统计快照
    pub async fn get_metrics(
        &self,
        request: &HttpRequest,
        params: MetricsParams,
    ) -> ActixResult<HttpResponse> {
        get::get_metrics(self, request, params).await
    }
}

/// 从存储读取快照并聚合
///
/// 只读取被选中作业的提交。
pub async fn load_metrics(storage: &dyn Storage, filter: &MetricsFilter) -> Result<Metrics> {
    let classes = storage.list_classes().await?;
    let students = storage.list_students(None).await?;
    let assignments = storage.list_assignments(None).await?;

    let selected: Vec<i64> = assignments
        .iter()
        .filter(|a| filter.class_id.is_none_or(|id| a.class_id == id))
        .filter(|a| filter.assignment_id.is_none_or(|id| a.id == id))
        .map(|a| a.id)
        .collect();
    let submissions = storage.list_submissions_for_assignments(&selected).await?;

    Ok(compute_metrics(
        MetricsInput {
            classes: &classes,
            students: &students,
            assignments: &assignments,
            submissions: &submissions,
        },
        filter,
    ))
}

/// 请求上下文中的缓存（未配置时为 None）
pub(crate) fn request_cache(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    super::injected::<dyn ObjectCache>(request).ok()
}

/// 每次失效加一；缓存键带上读取开始时的代数，
/// 失效之前开始计算的快照只会落到旧键上，不会再被读到
static CACHE_GENERATION: AtomicU64 = AtomicU64::new(0);

pub(crate) fn cache_generation() -> u64 {
    CACHE_GENERATION.load(Ordering::Acquire)
}

pub(crate) fn generation_key(generation: u64, filter: &MetricsFilter) -> String {
    format!("g{generation}:{}", filter.cache_key())
}

/// 提交数据变更后使统计缓存失效
pub async fn invalidate_metrics_cache(request: &HttpRequest) {
    // 先推进代数，再清空后端，保证清空之后的写入都用新键
    CACHE_GENERATION.fetch_add(1, Ordering::AcqRel);
    if let Some(cache) = request_cache(request) {
        cache.invalidate_all().await;
        debug!("Metrics cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::cache::{get_json, insert_json};
    use actix_web::test::TestRequest;
    use actix_web::web;

    #[tokio::test]
    async fn test_snapshot_computed_before_invalidation_is_never_served() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        let request = TestRequest::default()
            .app_data(web::Data::new(cache.clone()))
            .to_http_request();
        let filter = MetricsFilter::default();

        // 读取方记下代数并开始计算
        let started_at = cache_generation();
        // 计算期间一次批改完成并失效缓存
        invalidate_metrics_cache(&request).await;
        // 读取方带着旧代数写回它的旧快照
        insert_json(cache.as_ref(), &generation_key(started_at, &filter), &"stale", 0).await;

        let fresh_key = generation_key(cache_generation(), &filter);
        assert_ne!(fresh_key, generation_key(started_at, &filter));
        assert!(get_json::<String>(cache.as_ref(), &fresh_key).await.is_none());
    }
}
