use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::GradingService;
use crate::models::grading_jobs::responses::JobView;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::metrics::invalidate_metrics_cache;

/// 每次轮询推进一步，任务完成时使统计缓存失效
pub async fn advance_job(
    service: &GradingService,
    request: &HttpRequest,
    job_id: String,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.advance(&job_id).await {
        Ok(Some(outcome)) => {
            if outcome.completed_now {
                invalidate_metrics_cache(request).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                JobView::from(&outcome.job),
                "查询成功",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GradingJobNotFound,
            "批改任务不存在",
        ))),
        Err(e) => {
            error!("Failed to advance grading job {}: {}", job_id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::GradingFailed,
                format!("推进批改任务失败: {e}"),
            )))
        }
    }
}
