use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AssignmentService;
use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::models::assignments::responses::CreateAssignmentResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::metrics::invalidate_metrics_cache;
use crate::services::request_grading_config;
use crate::services::submissions::materialize::materialize_for_assignment;
use crate::utils::validate::validate_name;

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    mut body: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_name(&body.title) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("作业标题无效: {msg}"),
        )));
    }
    body.title = body.title.trim().to_string();
    body.knowledge = body
        .knowledge
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let storage = service.get_storage(request)?;

    match storage.get_class_by_id(body.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "班级不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级失败: {e}"),
                )),
            );
        }
    }

    let assignment = match storage.create_assignment(body).await {
        Ok(assignment) => assignment,
        Err(e) => {
            error!("Assignment creation failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::AssignmentCreationFailed,
                    format!("作业创建失败: {e}"),
                )),
            );
        }
    };

    let ratio = request_grading_config(request).submitted_ratio;
    let submissions_created =
        match materialize_for_assignment(storage.as_ref(), &assignment, ratio).await {
            Ok(created) => created,
            Err(e) => {
                error!(
                    "Assignment {} created but seeding submissions failed: {}",
                    assignment.id, e
                );
                0
            }
        };

    info!(
        "Assignment {} created in class {} with {} submissions",
        assignment.id, assignment.class_id, submissions_created
    );
    invalidate_metrics_cache(request).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        CreateAssignmentResponse {
            assignment,
            submissions_created,
        },
        "作业创建成功",
    )))
}
