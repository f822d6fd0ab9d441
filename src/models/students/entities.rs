use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct Student {
    pub id: i64,
    // 所属班级
    pub class_id: i64,
    pub name: String,
    pub email: String,
    // 学号（可选）
    pub student_no: Option<String>,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}
