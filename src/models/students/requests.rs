use serde::Deserialize;
use ts_rs::TS;

/// 创建学生请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct CreateStudentRequest {
    pub class_id: i64,
    pub name: String,
    pub email: String,
    pub student_no: Option<String>,
}

/// 学生列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListParams {
    /// 为空 = 全部
    pub class_id: Option<i64>,
}
