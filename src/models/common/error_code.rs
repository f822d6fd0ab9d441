/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    // 班级 / 学生
    ClassNotFound = 3000,
    ClassCreationFailed = 3001,
    StudentCreationFailed = 3101,

    // 作业
    AssignmentNotFound = 4000,
    AssignmentCreationFailed = 4001,
    AssignmentDeleteFailed = 4002,

    // 提交
    SubmissionNotFound = 5000,
    SubmissionUpdateFailed = 5001,
    SubmissionPatchInvalid = 5002,

    // 批改任务
    GradingJobNotFound = 6000,
    GradingJobCreationFailed = 6001,
    GradingFailed = 6002,
}
