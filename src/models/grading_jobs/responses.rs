use serde::Serialize;
use ts_rs::TS;

use crate::models::grading_jobs::entities::{GradingJob, JobStatus};

/// 创建批改任务响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct CreateGradingJobResponse {
    pub job_id: String,
    pub total: i32,
    /// 建议的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
}

/// 轮询返回的任务视图
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct JobView {
    pub id: String,
    pub assignment_id: i64,
    pub total: i32,
    pub processed: i32,
    pub status: JobStatus,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&GradingJob> for JobView {
    fn from(job: &GradingJob) -> Self {
        Self {
            id: job.id.clone(),
            assignment_id: job.assignment_id,
            total: job.total,
            processed: job.processed,
            status: job.status,
            completed_at: job.completed_at,
        }
    }
}

/// 作业的批改任务列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradingJobListResponse {
    pub items: Vec<GradingJob>,
}
