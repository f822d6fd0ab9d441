//! 统计聚合
//!
//! 纯函数：同样的输入快照总是得到同样的 [`Metrics`]。

use std::collections::HashMap;

use crate::models::assignments::entities::Assignment;
use crate::models::classes::entities::Class;
use crate::models::metrics::requests::MetricsFilter;
use crate::models::metrics::responses::{
    AssignmentAverage, AssignmentStatusBreakdown, ClassAverage, GradeBucket, Metrics,
    MetricsTotals, StatusCount,
};
use crate::models::students::entities::Student;
use crate::models::submissions::entities::{Submission, SubmissionStatus};

/// 分数段：(标签, 下限, 上限)，两端都包含
const GRADE_BUCKETS: [(&str, i32, i32); 5] = [
    ("<60", i32::MIN, 59),
    ("60-69", 60, 69),
    ("70-79", 70, 79),
    ("80-89", 80, 89),
    ("90-100", 90, i32::MAX),
];

/// 聚合所需的数据快照
#[derive(Debug, Clone, Copy)]
pub struct MetricsInput<'a> {
    pub classes: &'a [Class],
    pub students: &'a [Student],
    pub assignments: &'a [Assignment],
    /// 至少包含所有被选中作业的提交，其余作业的提交会被忽略
    pub submissions: &'a [Submission],
}

pub fn compute_metrics(input: MetricsInput<'_>, filter: &MetricsFilter) -> Metrics {
    let selected: Vec<&Assignment> = input
        .assignments
        .iter()
        .filter(|a| filter.class_id.is_none_or(|id| a.class_id == id))
        .filter(|a| filter.assignment_id.is_none_or(|id| a.id == id))
        .collect();

    let mut by_assignment: HashMap<i64, Vec<&Submission>> =
        selected.iter().map(|a| (a.id, Vec::new())).collect();
    for submission in input.submissions {
        if let Some(bucket) = by_assignment.get_mut(&submission.assignment_id) {
            bucket.push(submission);
        }
    }

    let working: Vec<&Submission> = selected
        .iter()
        .flat_map(|a| by_assignment[&a.id].iter().copied())
        .collect();
    let graded: Vec<i32> = working.iter().filter_map(|s| s.graded_score()).collect();
    let avg_score = average(&graded);

    let (grade_buckets, status_counts) = if selected.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        (bucket_scores(&graded), count_statuses(&working))
    };

    // 班级平均：按被选中作业中首次出现的顺序
    let mut class_order: Vec<i64> = Vec::new();
    let mut class_scores: HashMap<i64, Vec<i32>> = HashMap::new();
    for assignment in &selected {
        if !class_scores.contains_key(&assignment.class_id) {
            class_order.push(assignment.class_id);
        }
        class_scores
            .entry(assignment.class_id)
            .or_default()
            .extend(
                by_assignment[&assignment.id]
                    .iter()
                    .filter_map(|s| s.graded_score()),
            );
    }
    let class_names: HashMap<i64, &str> = input
        .classes
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    let avg_by_class = class_order
        .into_iter()
        .map(|class_id| ClassAverage {
            class_id,
            class_name: class_names
                .get(&class_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| class_id.to_string()),
            avg: average(&class_scores[&class_id]),
        })
        .collect();

    let avg_by_assignment = selected
        .iter()
        .map(|a| {
            let scores: Vec<i32> = by_assignment[&a.id]
                .iter()
                .filter_map(|s| s.graded_score())
                .collect();
            AssignmentAverage {
                assignment_id: a.id,
                title: a.title.clone(),
                avg: average(&scores),
            }
        })
        .collect();

    let status_by_assignment = selected
        .iter()
        .map(|a| {
            let subs = &by_assignment[&a.id];
            let count = |status: SubmissionStatus| {
                subs.iter().filter(|s| s.status == status).count() as i64
            };
            AssignmentStatusBreakdown {
                assignment_id: a.id,
                title: a.title.clone(),
                pending: count(SubmissionStatus::Pending),
                submitted: count(SubmissionStatus::Submitted),
                graded: count(SubmissionStatus::Graded),
            }
        })
        .collect();

    let students = input
        .students
        .iter()
        .filter(|s| filter.class_id.is_none_or(|id| s.class_id == id))
        .count() as i64;
    let classes = match filter.class_id {
        Some(_) => 1,
        None => {
            let mut ids: Vec<i64> = input
                .students
                .iter()
                .map(|s| s.class_id)
                .chain(input.assignments.iter().map(|a| a.class_id))
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids.len() as i64
        }
    };

    Metrics {
        totals: MetricsTotals {
            students,
            classes,
            assignments: selected.len() as i64,
            graded: graded.len() as i64,
            avg_score,
        },
        grade_buckets,
        status_counts,
        avg_by_class,
        avg_by_assignment,
        status_by_assignment,
    }
}

/// 平均分保留一位小数（四舍五入，远离零）；无数据时为 None
fn average(scores: &[i32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let mean = sum as f64 / scores.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

fn bucket_scores(scores: &[i32]) -> Vec<GradeBucket> {
    GRADE_BUCKETS
        .iter()
        .map(|&(label, low, high)| GradeBucket {
            label: label.to_string(),
            count: scores.iter().filter(|&&s| s >= low && s <= high).count() as i64,
        })
        .collect()
}

fn count_statuses(submissions: &[&Submission]) -> Vec<StatusCount> {
    SubmissionStatus::all()
        .iter()
        .map(|&status| StatusCount {
            name: status.as_str().to_string(),
            value: submissions.iter().filter(|s| s.status == status).count() as i64,
        })
        .collect()
}
