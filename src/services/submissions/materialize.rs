use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{error, info};

use super::SubmissionService;
use crate::errors::Result;
use crate::models::assignments::entities::Assignment;
use crate::models::students::entities::Student;
use crate::models::submissions::entities::{NewSubmission, SubmissionStatus};
use crate::models::submissions::responses::MaterializeSubmissionsResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::metrics::invalidate_metrics_cache;
use crate::services::request_grading_config;
use crate::storage::Storage;

/// 为班级学生生成提交种子
///
/// 每个学生以 `submitted_ratio` 的概率为 submitted（提交时间为 `now - (idx + 1) 小时`），
/// 否则为 pending。
pub fn plan_submissions<R: Rng>(
    students: &[Student],
    submitted_ratio: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<NewSubmission> {
    let ratio = submitted_ratio.clamp(0.0, 1.0);
    students
        .iter()
        .enumerate()
        .map(|(idx, student)| {
            let submitted = rng.random_bool(ratio);
            NewSubmission {
                student_id: student.id,
                name: student.name.clone(),
                email: student.email.clone(),
                status: if submitted {
                    SubmissionStatus::Submitted
                } else {
                    SubmissionStatus::Pending
                },
                submitted_at: submitted.then(|| now - Duration::hours(idx as i64 + 1)),
            }
        })
        .collect()
}

/// 作业尚无提交时，按所属班级的学生生成；返回新建数量
pub async fn materialize_for_assignment(
    storage: &dyn Storage,
    assignment: &Assignment,
    submitted_ratio: f64,
) -> Result<i64> {
    let students = storage.list_students(Some(assignment.class_id)).await?;
    let planned = plan_submissions(&students, submitted_ratio, Utc::now(), &mut rand::rng());
    storage.create_submissions(assignment.id, planned).await
}

pub async fn materialize_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = request_grading_config(request);

    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "作业不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询作业失败: {e}"),
                )),
            );
        }
    };

    let created =
        match materialize_for_assignment(storage.as_ref(), &assignment, config.submitted_ratio)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                error!("Failed to materialize submissions for {}: {}", assignment_id, e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::SubmissionUpdateFailed,
                        format!("生成提交失败: {e}"),
                    )),
                );
            }
        };

    if created > 0 {
        info!(
            "Materialized {} submissions for assignment {}",
            created, assignment_id
        );
        invalidate_metrics_cache(request).await;
    }

    match storage.list_submissions(assignment_id).await {
        Ok(all) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MaterializeSubmissionsResponse {
                assignment_id,
                created,
                total: all.len() as i64,
            },
            "生成成功",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询提交列表失败: {e}"),
            )),
        ),
    }
}
