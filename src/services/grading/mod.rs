pub mod advance;
pub mod create;
pub mod engine;
pub mod grader;
pub mod list;
pub mod regrade;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

pub use engine::{AdvanceOutcome, GradingEngine};
pub use grader::{Grader, RandomGrader};

use crate::models::grading_jobs::requests::CreateGradingJobRequest;

pub struct GradingService;

impl GradingService {
    pub(crate) fn get_engine(&self, request: &HttpRequest) -> ActixResult<Arc<GradingEngine>> {
        super::injected(request)
    }

    // 创建批改任务
    pub async fn create_job(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        body: CreateGradingJobRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_job(self, request, assignment_id, body).await
    }

    // 轮询并推进批改任务
    pub async fn advance_job(&self, request: &HttpRequest, job_id: String) -> ActixResult<HttpResponse> {
        advance::advance_job(self, request, job_id).await
    }

    // 列出作业的批改任务
    pub async fn list_jobs(&self, request: &HttpRequest, assignment_id: i64) -> ActixResult<HttpResponse> {
        list::list_jobs(self, request, assignment_id).await
    }

    // 单条提交重新评分
    pub async fn regrade_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        regrade::regrade_submission(self, request, assignment_id, submission_id).await
    }
}
