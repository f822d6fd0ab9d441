use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::warn;

use super::SystemService;
use crate::models::system::responses::HealthResponse;
use crate::models::{ApiResponse, AppStartTime};

pub async fn health(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let database = match storage.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: {}", e);
            false
        }
    };

    let uptime_seconds = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| {
            chrono::Utc::now()
                .signed_duration_since(start.start_datetime)
                .num_seconds()
        })
        .unwrap_or(0);

    let response = HealthResponse {
        system_name: service.get_config().app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        database,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "服务运行正常")))
}
