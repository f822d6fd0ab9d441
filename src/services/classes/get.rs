use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ClassService, load_summaries};
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "班级不存在",
            )));
        }
        Err(e) => return Ok(storage_failure(format!("查询班级失败: {e}"))),
    };

    match load_summaries(storage.as_ref(), vec![class]).await {
        Ok(mut summaries) => match summaries.pop() {
            Some(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "查询成功"))),
            None => Ok(storage_failure("班级汇总为空".to_string())),
        },
        Err(e) => Ok(storage_failure(format!("统计班级规模失败: {e}"))),
    }
}

fn storage_failure(message: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        message,
    ))
}
