use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ClassService, load_summaries};
use crate::errors::Result;
use crate::models::classes::requests::ClassListParams;
use crate::models::classes::responses::{ClassListResponse, ClassSummary};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    params: ClassListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let keyword = params
        .keyword
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty());

    match matching_summaries(storage.as_ref(), keyword.as_deref()).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询班级列表失败: {e}"),
            )),
        ),
    }
}

async fn matching_summaries(
    storage: &dyn Storage,
    keyword: Option<&str>,
) -> Result<Vec<ClassSummary>> {
    let classes = storage
        .list_classes()
        .await?
        .into_iter()
        .filter(|c| keyword.is_none_or(|k| c.name.to_lowercase().contains(k)))
        .collect();
    load_summaries(storage, classes).await
}
