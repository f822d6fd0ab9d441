pub mod assignments;
pub mod classes;
pub mod grading;
pub mod metrics;
pub mod students;
pub mod submissions;
pub mod system;

pub use assignments::AssignmentService;
pub use classes::ClassService;
pub use grading::{GradingEngine, GradingService};
pub use metrics::MetricsService;
pub use students::StudentService;
pub use submissions::SubmissionService;
pub use system::SystemService;

use std::sync::Arc;

use actix_web::{HttpRequest, Result as ActixResult, error, web};

use crate::config::GradingConfig;

/// 取出启动时以 `web::Data<Arc<T>>` 注入的共享组件
pub(crate) fn injected<T: ?Sized + 'static>(request: &HttpRequest) -> ActixResult<Arc<T>> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error::ErrorInternalServerError(format!(
                "{} is not registered in app data",
                std::any::type_name::<T>()
            ))
        })
}

/// 请求上下文中的批改配置（未注入时使用默认值）
pub(crate) fn request_grading_config(request: &HttpRequest) -> GradingConfig {
    request
        .app_data::<web::Data<GradingConfig>>()
        .map(|config| config.get_ref().clone())
        .unwrap_or_default()
}
