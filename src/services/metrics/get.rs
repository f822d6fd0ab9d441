use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, error};

use super::{MetricsService, cache_generation, generation_key, load_metrics, request_cache};
use crate::cache::{get_json, insert_json};
use crate::models::metrics::requests::{MetricsFilter, MetricsParams};
use crate::models::metrics::responses::Metrics;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_metrics(
    service: &MetricsService,
    request: &HttpRequest,
    params: MetricsParams,
) -> ActixResult<HttpResponse> {
    let filter = match MetricsFilter::try_from(params) {
        Ok(filter) => filter,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    let cache = request_cache(request);
    // 在读存储之前取代数，计算期间发生的失效会让这次写入落空
    let key = generation_key(cache_generation(), &filter);

    if let Some(cache) = &cache
        && let Some(metrics) = get_json::<Metrics>(cache.as_ref(), &key).await
    {
        debug!("Metrics cache hit: {}", key);
        return Ok(HttpResponse::Ok().json(ApiResponse::success(metrics, "查询成功")));
    }
    debug!("Metrics cache miss: {}", key);

    let storage = service.get_storage(request)?;
    match load_metrics(storage.as_ref(), &filter).await {
        Ok(metrics) => {
            if let Some(cache) = &cache {
                insert_json(cache.as_ref(), &key, &metrics, 0).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(metrics, "查询成功")))
        }
        Err(e) => {
            error!("Failed to compute metrics: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("统计计算失败: {e}"),
            )))
        }
    }
}
