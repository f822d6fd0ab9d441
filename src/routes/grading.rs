use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::grading_jobs::requests::CreateGradingJobRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::GradingService;

static GRADING_SERVICE: GradingService = GradingService;

// 创建批改任务（请求体可省略，但给出时必须合法）
pub async fn create_job(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let body = match CreateGradingJobRequest::from_body(&body) {
        Ok(body) => body,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("请求体格式错误: {e}"),
            )));
        }
    };
    GRADING_SERVICE
        .create_job(&req, path.into_inner(), body)
        .await
}

pub async fn list_jobs(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.list_jobs(&req, path.into_inner()).await
}

// 轮询任务进度（每次轮询推进一步）
pub async fn poll_job(req: HttpRequest, path: web::Path<String>) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.advance_job(&req, path.into_inner()).await
}

// 配置路由
pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments/{id}/grade-jobs")
            .route("", web::post().to(create_job))
            .route("", web::get().to(list_jobs)),
    )
    .service(web::scope("/api/v1/grade-jobs").route("/{job_id}", web::get().to(poll_job)));
}
