use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::pagination::PaginationQuery;
use crate::models::submissions::entities::SubmissionStatus;

/// 提交列表状态筛选
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatusFilter {
    #[default]
    All,
    Pending,
    Submitted,
    Graded,
}

impl SubmissionStatusFilter {
    pub fn as_status(&self) -> Option<SubmissionStatus> {
        match self {
            SubmissionStatusFilter::All => None,
            SubmissionStatusFilter::Pending => Some(SubmissionStatus::Pending),
            SubmissionStatusFilter::Submitted => Some(SubmissionStatus::Submitted),
            SubmissionStatusFilter::Graded => Some(SubmissionStatus::Graded),
        }
    }
}

/// 提交列表查询参数（HTTP 请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<SubmissionStatusFilter>,
    /// 按姓名或邮箱模糊搜索（不区分大小写）
    pub keyword: Option<String>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone)]
pub struct SubmissionListQuery {
    pub page: i64,
    pub size: i64,
    pub status: Option<SubmissionStatus>,
    pub keyword: Option<String>,
}

impl From<SubmissionListParams> for SubmissionListQuery {
    fn from(params: SubmissionListParams) -> Self {
        let (page, size) = params.pagination.normalized();
        let keyword = params
            .keyword
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());
        Self {
            page,
            size,
            status: params.status.unwrap_or_default().as_status(),
            keyword,
        }
    }
}

/// 更新提交请求（分数/评语/状态）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct UpdateSubmissionRequest {
    pub score: Option<i32>,
    pub feedback: Option<String>,
    pub status: Option<SubmissionStatus>,
}
