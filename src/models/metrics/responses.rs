use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 统计快照（派生视图，不持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct Metrics {
    pub totals: MetricsTotals,
    pub grade_buckets: Vec<GradeBucket>,
    pub status_counts: Vec<StatusCount>,
    pub avg_by_class: Vec<ClassAverage>,
    pub avg_by_assignment: Vec<AssignmentAverage>,
    pub status_by_assignment: Vec<AssignmentStatusBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct MetricsTotals {
    pub students: i64,
    pub classes: i64,
    pub assignments: i64,
    pub graded: i64,
    pub avg_score: Option<f64>,
}

/// 分数段计数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct GradeBucket {
    pub label: String,
    pub count: i64,
}

/// 提交状态计数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct StatusCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct ClassAverage {
    pub class_id: i64,
    pub class_name: String,
    pub avg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct AssignmentAverage {
    pub assignment_id: i64,
    pub title: String,
    pub avg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct AssignmentStatusBreakdown {
    pub assignment_id: i64,
    pub title: String,
    pub pending: i64,
    pub submitted: i64,
    pub graded: i64,
}
