use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{ErrorClass, GradingError};
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    fn build(code: ErrorCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, Some(data), message)
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, None, message)
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(code, None, message)
    }

    /// 按错误类别选择业务错误码，消息取错误详情
    pub fn from_error(err: &GradingError) -> Self {
        let code = match err.class() {
            ErrorClass::Invalid => ErrorCode::BadRequest,
            ErrorClass::Missing => ErrorCode::NotFound,
            ErrorClass::Stale => ErrorCode::Conflict,
            ErrorClass::Internal => ErrorCode::InternalServerError,
        };
        Self::error_empty(code, err.message())
    }
}
