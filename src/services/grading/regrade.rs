use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::GradingService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::metrics::invalidate_metrics_cache;

pub async fn regrade_submission(
    service: &GradingService,
    request: &HttpRequest,
    assignment_id: i64,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.regrade_one(assignment_id, submission_id).await {
        Ok(Some(submission)) => {
            invalidate_metrics_cache(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "重新评分成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "提交不存在",
        ))),
        Err(e) => {
            error!(
                "Failed to regrade submission {} of assignment {}: {}",
                submission_id, assignment_id, e
            );
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::GradingFailed,
                format!("重新评分失败: {e}"),
            )))
        }
    }
}
