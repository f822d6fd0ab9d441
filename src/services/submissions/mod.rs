pub mod detail;
pub mod list;
pub mod materialize;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::submissions::requests::{SubmissionListParams, UpdateSubmissionRequest};
use crate::storage::Storage;

pub struct SubmissionService;

impl SubmissionService {

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::injected(request)
    }

    /// 列出提交
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        params: SubmissionListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_submissions(self, request, assignment_id, params).await
    }

    /// 获取提交详情
    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, assignment_id, submission_id).await
    }

    /// 修改分数、评语或状态
    pub async fn update_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        submission_id: i64,
        patch: UpdateSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_submission(self, request, assignment_id, submission_id, patch).await
    }

    /// 为作业生成提交种子
    pub async fn materialize_submissions(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        materialize::materialize_submissions(self, request, assignment_id).await
    }
}
