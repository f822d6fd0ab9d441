use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::services::SystemService;

static SYSTEM_SERVICE: SystemService = SystemService;

pub async fn health(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.health(&request).await
}

// 配置路由
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1/system").route("/health", web::get().to(health)));
}
