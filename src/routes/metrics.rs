use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::metrics::requests::MetricsParams;
use crate::services::MetricsService;

static METRICS_SERVICE: MetricsService = MetricsService;

pub async fn get_metrics(
    req: HttpRequest,
    query: web::Query<MetricsParams>,
) -> ActixResult<HttpResponse> {
    METRICS_SERVICE.get_metrics(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_metrics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1/metrics").route("", web::get().to(get_metrics)));
}
