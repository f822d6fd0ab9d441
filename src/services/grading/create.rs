use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::GradingService;
use crate::models::grading_jobs::{
    requests::CreateGradingJobRequest, responses::CreateGradingJobResponse,
};
use crate::models::{ApiResponse, ErrorCode};

pub async fn create_job(
    service: &GradingService,
    request: &HttpRequest,
    assignment_id: i64,
    body: CreateGradingJobRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.create_job(assignment_id, body.options()).await {
        Ok(Some(job)) => Ok(HttpResponse::Created().json(ApiResponse::success(
            CreateGradingJobResponse {
                job_id: job.id,
                total: job.total,
                poll_interval_ms: engine.config().poll_interval_ms,
            },
            "批改任务已创建",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "作业不存在",
        ))),
        Err(e) => {
            error!("Failed to create grading job for assignment {}: {}", assignment_id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::GradingJobCreationFailed,
                format!("创建批改任务失败: {e}"),
            )))
        }
    }
}
