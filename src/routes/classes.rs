use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::classes::requests::{ClassListParams, CreateClassRequest};
use crate::services::ClassService;

static CLASS_SERVICE: ClassService = ClassService;

// HTTP处理程序
pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<ClassListParams>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_classes(&req, query.into_inner()).await
}

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn get_class(req: HttpRequest, class_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_class(&req, class_id.into_inner()).await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes")
            .route("", web::get().to(list_classes))
            .route("", web::post().to(create_class))
            .route("/{class_id}", web::get().to(get_class)),
    );
}
