use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::submissions::requests::{SubmissionListParams, UpdateSubmissionRequest};
use crate::services::{GradingService, SubmissionService};

static SUBMISSION_SERVICE: SubmissionService = SubmissionService;
static GRADING_SERVICE: GradingService = GradingService;

// 列出提交
pub async fn list_submissions(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_submissions(&req, path.into_inner(), query.into_inner())
        .await
}

// 获取提交详情
pub async fn get_submission(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (assignment_id, submission_id) = path.into_inner();
    SUBMISSION_SERVICE
        .get_submission(&req, assignment_id, submission_id)
        .await
}

// 修改提交
pub async fn update_submission(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    let (assignment_id, submission_id) = path.into_inner();
    SUBMISSION_SERVICE
        .update_submission(&req, assignment_id, submission_id, body.into_inner())
        .await
}

// 单条重新评分
pub async fn regrade_submission(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (assignment_id, submission_id) = path.into_inner();
    GRADING_SERVICE
        .regrade_submission(&req, assignment_id, submission_id)
        .await
}

// 生成提交种子
pub async fn materialize_submissions(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .materialize_submissions(&req, path.into_inner())
        .await
}

// 配置路由
pub fn configure_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments/{id}/submissions")
            .route("", web::get().to(list_submissions))
            .route("/materialize", web::post().to(materialize_submissions))
            .route("/{sid}", web::get().to(get_submission))
            .route("/{sid}", web::patch().to(update_submission))
            .route("/{sid}/regrade", web::post().to(regrade_submission)),
    );
}
