use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 提交状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatus {
    Pending,   // 待提交
    Submitted, // 已提交
    Graded,    // 已批改
}

impl SubmissionStatus {
    pub const PENDING: &'static str = "pending";
    pub const SUBMITTED: &'static str = "submitted";
    pub const GRADED: &'static str = "graded";

    pub fn all() -> &'static [SubmissionStatus] {
        &[Self::Pending, Self::Submitted, Self::Graded]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => Self::PENDING,
            SubmissionStatus::Submitted => Self::SUBMITTED,
            SubmissionStatus::Graded => Self::GRADED,
        }
    }

    /// 该状态下是否应当带有提交时间
    pub fn carries_submitted_at(&self) -> bool {
        matches!(self, SubmissionStatus::Submitted | SubmissionStatus::Graded)
    }
}

impl<'de> Deserialize<'de> for SubmissionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的提交状态: '{s}'. 支持的状态: pending, submitted, graded"
            ))
        })
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(SubmissionStatus::Pending),
            Self::SUBMITTED => Ok(SubmissionStatus::Submitted),
            Self::GRADED => Ok(SubmissionStatus::Graded),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

/// 学生在某个作业下的提交记录
///
/// 不变量：`score` 仅在 `graded` 时存在；`submitted_at` 仅在 `submitted`/`graded` 时存在。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    // 学生姓名（冗余，便于列表展示）
    pub name: String,
    pub email: String,
    pub status: SubmissionStatus,
    pub score: Option<i32>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub feedback: Option<String>,
}

impl Submission {
    /// 是否为已批改且带有分数的记录
    pub fn graded_score(&self) -> Option<i32> {
        match self.status {
            SubmissionStatus::Graded => self.score,
            _ => None,
        }
    }
}

/// 生成提交种子时使用的新记录
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub status: SubmissionStatus,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 写回存储层的提交字段
#[derive(Debug, Clone)]
pub struct SubmissionUpdate {
    pub status: SubmissionStatus,
    pub score: Option<i32>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub feedback: Option<String>,
    /// 若设置，仅当当前状态仍为该值时才写入
    pub expected_status: Option<SubmissionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in SubmissionStatus::all() {
            assert_eq!(status.as_str().parse::<SubmissionStatus>(), Ok(*status));
        }
        assert!("late".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_status_deserialize_rejects_unknown() {
        let ok: SubmissionStatus = serde_json::from_str("\"graded\"").unwrap();
        assert_eq!(ok, SubmissionStatus::Graded);
        assert!(serde_json::from_str::<SubmissionStatus>("\"done\"").is_err());
    }
}
