use serde::Deserialize;
use ts_rs::TS;

use crate::models::grading_jobs::entities::GradeJobOptions;

/// 创建批改任务请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct CreateGradingJobRequest {
    /// 缺省为 true（只批改未批改的提交）
    pub only_ungraded: Option<bool>,
}

impl CreateGradingJobRequest {
    /// 解析可省略的请求体：空白视为默认选项，其余必须是合法 JSON
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }

    pub fn options(&self) -> GradeJobOptions {
        GradeJobOptions {
            only_ungraded: self.only_ungraded.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_defaults() {
        assert!(CreateGradingJobRequest::from_body(b"").unwrap().options().only_ungraded);
        assert!(CreateGradingJobRequest::from_body(b" \n").unwrap().options().only_ungraded);
    }

    #[test]
    fn test_explicit_false_is_kept() {
        let request = CreateGradingJobRequest::from_body(br#"{"only_ungraded": false}"#).unwrap();
        assert!(!request.options().only_ungraded);
    }

    #[test]
    fn test_mistyped_flag_is_rejected() {
        assert!(CreateGradingJobRequest::from_body(br#"{"only_ungraded":"false"}"#).is_err());
        assert!(CreateGradingJobRequest::from_body(b"only_ungraded=false").is_err());
    }
}
