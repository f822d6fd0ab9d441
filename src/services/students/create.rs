use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::StudentService;
use crate::models::students::requests::CreateStudentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::metrics::invalidate_metrics_cache;
use crate::utils::validate::{validate_email, validate_name};

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    mut student: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_name(&student.name).and(validate_email(student.email.trim())) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            msg,
        )));
    }
    student.name = student.name.trim().to_string();
    student.email = student.email.trim().to_string();
    student.student_no = student
        .student_no
        .map(|no| no.trim().to_string())
        .filter(|no| !no.is_empty());

    let storage = service.get_storage(request)?;

    match storage.get_class_by_id(student.class_id).await {
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

    match storage.create_student(student).await {
        Ok(student) => {
            info!("Student {} joined class {}", student.id, student.class_id);
            invalidate_metrics_cache(request).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(student, "学生创建成功")))
        }
        Err(e) => {
            error!("Student creation failed: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::StudentCreationFailed,
                    format!("学生创建失败: {e}"),
                )),
            )
        }
    }
}
