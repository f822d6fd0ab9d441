pub mod assignments;

pub mod classes;

pub mod grading;

pub mod metrics;

pub mod students;

pub mod submissions;

pub mod system;

pub use assignments::configure_assignments_routes;
pub use classes::configure_classes_routes;
pub use grading::configure_grading_routes;
pub use metrics::configure_metrics_routes;
pub use students::configure_students_routes;
pub use submissions::configure_submissions_routes;
pub use system::configure_system_routes;

use actix_web::web;

/// 注册全部 API 路由
///
/// 提交与批改任务的路由挂在 `/api/v1/assignments/{id}` 下，需先于作业路由注册。
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_submissions_routes)
        .configure(configure_grading_routes)
        .configure(configure_assignments_routes)
        .configure(configure_classes_routes)
        .configure(configure_students_routes)
        .configure(configure_metrics_routes)
        .configure(configure_system_routes);
}
