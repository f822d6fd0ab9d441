pub mod assignments;
pub mod classes;
pub mod common;
pub mod grading_jobs;
pub mod metrics;
pub mod students;
pub mod submissions;
pub mod system;

pub use common::error_code::ErrorCode;
pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
