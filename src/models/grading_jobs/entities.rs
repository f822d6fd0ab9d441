use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::submissions::entities::SubmissionStatus;

// 批改任务状态，只允许 queued → running → done 单向推进
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "done" => Ok(JobStatus::Done),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

/// 批改任务选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradeJobOptions {
    /// true = 只批改已提交未批改的；false = 已提交与已批改的全部重新批改并覆盖分数
    pub only_ungraded: bool,
}

impl Default for GradeJobOptions {
    fn default() -> Self {
        Self {
            only_ungraded: true,
        }
    }
}

impl GradeJobOptions {
    /// 任务作用范围内的提交状态
    pub fn target_statuses(&self) -> &'static [SubmissionStatus] {
        if self.only_ungraded {
            &[SubmissionStatus::Submitted]
        } else {
            &[SubmissionStatus::Submitted, SubmissionStatus::Graded]
        }
    }

    pub fn matches(&self, status: SubmissionStatus) -> bool {
        self.target_statuses().contains(&status)
    }
}

/// 批改任务记录
///
/// 不变量：`0 <= processed <= total`；`total > 0` 时 `processed == total` 当且仅当 `status == done`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradingJob {
    pub id: String,
    pub assignment_id: i64,
    pub total: i32,
    pub processed: i32,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub options: GradeJobOptions,
}

impl GradingJob {
    /// 生成新的任务 ID
    pub fn new_id() -> String {
        format!("job_{}", uuid::Uuid::new_v4().simple())
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Done
    }
}

/// 任务推进的写入条件：仅当存储中的记录仍处于 `from_*` 状态时才写入
#[derive(Debug, Clone)]
pub struct JobTransition {
    pub job_id: String,
    pub from_status: JobStatus,
    pub from_processed: i32,
    pub to_status: JobStatus,
    pub to_processed: i32,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 任务完成时写回的分数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeAssignment {
    pub submission_id: i64,
    pub score: i32,
}
