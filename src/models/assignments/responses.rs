use serde::Serialize;
use ts_rs::TS;

use crate::models::assignments::entities::Assignment;

/// 作业列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
}

/// 创建作业响应（包含生成的提交种子数）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentResponse {
    pub assignment: Assignment,
    pub submissions_created: i64,
}
