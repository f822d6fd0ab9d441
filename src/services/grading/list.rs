use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::models::grading_jobs::responses::GradingJobListResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_jobs(
    service: &GradingService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.list_jobs(assignment_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            GradingJobListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询批改任务失败: {e}"),
            )),
        ),
    }
}
