use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::SubmissionService;
use crate::errors::GradingError;
use crate::models::submissions::entities::{Submission, SubmissionStatus, SubmissionUpdate};
use crate::models::submissions::requests::UpdateSubmissionRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::metrics::invalidate_metrics_cache;
use crate::utils::validate::validate_score;

/// 将补丁应用到当前提交上，保持状态与分数/提交时间的一致性：
///
/// - 只给分数不给状态时视为批改（状态置为 graded）
/// - 分数只能出现在 graded 状态，且在 0..=100 内
/// - 离开 graded 时清除分数；pending 清除提交时间
/// - 进入 submitted/graded 时若无提交时间则补上 `now`
///
/// 返回的更新以当前状态为写入条件，避免覆盖并发的批改结果。
pub fn apply_patch(
    current: &Submission,
    patch: UpdateSubmissionRequest,
    now: DateTime<Utc>,
) -> Result<SubmissionUpdate, String> {
    let status = match (patch.status, patch.score) {
        (Some(status), _) => status,
        (None, Some(_)) => SubmissionStatus::Graded,
        (None, None) => current.status,
    };

    let score = match patch.score {
        Some(score) => {
            if status != SubmissionStatus::Graded {
                return Err(format!("状态为 {status} 的提交不能设置分数"));
            }
            validate_score(score).map_err(|e| e.to_string())?;
            Some(score)
        }
        None if status == SubmissionStatus::Graded => current.score,
        None => None,
    };

    let submitted_at = if status.carries_submitted_at() {
        current.submitted_at.or(Some(now))
    } else {
        None
    };

    let feedback = match patch.feedback {
        Some(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        None => current.feedback.clone(),
    };

    Ok(SubmissionUpdate {
        status,
        score,
        submitted_at,
        feedback,
        expected_status: Some(current.status),
    })
}

pub async fn update_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
    submission_id: i64,
    patch: UpdateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let current = match storage.get_submission(assignment_id, submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "提交不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询提交失败: {e}"),
                )),
            );
        }
    };

    let update = match apply_patch(&current, patch, Utc::now()) {
        Ok(update) => update,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::SubmissionPatchInvalid,
                msg,
            )));
        }
    };

    match storage
        .update_submission(assignment_id, submission_id, update)
        .await
    {
        Ok(Some(submission)) => {
            info!(
                "Submission {} of assignment {} updated to {}",
                submission_id, assignment_id, submission.status
            );
            invalidate_metrics_cache(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "更新成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "提交不存在",
        ))),
        Err(e @ GradingError::Conflict(_)) => {
            warn!("Submission update lost a race: {}", e);
            Ok(HttpResponse::build(e.class().status()).json(ApiResponse::from_error(&e)))
        }
        Err(e) => {
            error!("Failed to update submission {}: {}", submission_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::SubmissionUpdateFailed,
                    format!("更新提交失败: {e}"),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(status: SubmissionStatus, score: Option<i32>) -> Submission {
        Submission {
            id: 1,
            assignment_id: 1,
            student_id: 1,
            name: "李雷".to_string(),
            email: "lilei@example.com".to_string(),
            status,
            score,
            submitted_at: status
                .carries_submitted_at()
                .then(|| DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()),
            feedback: Some("字迹工整".to_string()),
        }
    }

    #[test]
    fn test_score_alone_marks_graded() {
        let now = Utc::now();
        let update = apply_patch(
            &current(SubmissionStatus::Pending, None),
            UpdateSubmissionRequest {
                score: Some(92),
                ..Default::default()
            },
            now,
        )
        .unwrap();

        assert_eq!(update.status, SubmissionStatus::Graded);
        assert_eq!(update.score, Some(92));
        assert_eq!(update.submitted_at, Some(now));
        assert_eq!(update.expected_status, Some(SubmissionStatus::Pending));
        assert_eq!(update.feedback.as_deref(), Some("字迹工整"));
    }

    #[test]
    fn test_leaving_graded_clears_score() {
        let base = current(SubmissionStatus::Graded, Some(80));
        let update = apply_patch(
            &base,
            UpdateSubmissionRequest {
                status: Some(SubmissionStatus::Submitted),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(update.score, None);
        assert_eq!(update.submitted_at, base.submitted_at);

        let update = apply_patch(
            &base,
            UpdateSubmissionRequest {
                status: Some(SubmissionStatus::Pending),
                feedback: Some("  ".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(update.score, None);
        assert_eq!(update.submitted_at, None);
        assert_eq!(update.feedback, None);
    }

    #[test]
    fn test_graded_keeps_existing_score() {
        let update = apply_patch(
            &current(SubmissionStatus::Graded, Some(66)),
            UpdateSubmissionRequest {
                feedback: Some("再检查一下第三题".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(update.status, SubmissionStatus::Graded);
        assert_eq!(update.score, Some(66));
    }

    #[test]
    fn test_invalid_patches_rejected() {
        let base = current(SubmissionStatus::Submitted, None);
        assert!(
            apply_patch(
                &base,
                UpdateSubmissionRequest {
                    score: Some(70),
                    status: Some(SubmissionStatus::Submitted),
                    ..Default::default()
                },
                Utc::now(),
            )
            .is_err()
        );
        assert!(
            apply_patch(
                &base,
                UpdateSubmissionRequest {
                    score: Some(101),
                    ..Default::default()
                },
                Utc::now(),
            )
            .is_err()
        );
    }
}
