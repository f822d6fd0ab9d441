use std::sync::Arc;

use crate::models::{
    assignments::{entities::Assignment, requests::CreateAssignmentRequest},
    classes::{entities::Class, requests::CreateClassRequest},
    grading_jobs::entities::{GradeAssignment, GradingJob, JobTransition},
    students::{entities::Student, requests::CreateStudentRequest},
    submissions::{
        entities::{NewSubmission, Submission, SubmissionStatus, SubmissionUpdate},
        requests::SubmissionListQuery,
        responses::SubmissionListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 班级目录
    // 创建班级
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 列出全部班级
    async fn list_classes(&self) -> Result<Vec<Class>>;

    /// 学生目录
    // 创建学生
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    // 列出学生（可按班级筛选）
    async fn list_students(&self, class_id: Option<i64>) -> Result<Vec<Student>>;

    /// 作业目录
    // 创建作业
    async fn create_assignment(&self, assignment: CreateAssignmentRequest) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    // 列出作业（可按班级筛选）
    async fn list_assignments(&self, class_id: Option<i64>) -> Result<Vec<Assignment>>;
    // 删除作业，级联删除提交与批改任务
    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool>;

    /// 提交管理
    // 为作业生成提交，已有提交时不做任何事，返回新建数量
    async fn create_submissions(
        &self,
        assignment_id: i64,
        submissions: Vec<NewSubmission>,
    ) -> Result<i64>;
    // 列出作业下的全部提交
    async fn list_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>>;
    // 批量列出多个作业的提交
    async fn list_submissions_for_assignments(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>>;
    // 分页列出提交
    async fn list_submissions_with_pagination(
        &self,
        assignment_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse>;
    // 获取单个提交
    async fn get_submission(&self, assignment_id: i64, submission_id: i64)
    -> Result<Option<Submission>>;
    // 更新提交；设置 expected_status 时状态不符返回 Conflict
    async fn update_submission(
        &self,
        assignment_id: i64,
        submission_id: i64,
        update: SubmissionUpdate,
    ) -> Result<Option<Submission>>;

    /// 批改任务
    // 创建任务记录
    async fn create_grading_job(&self, job: GradingJob) -> Result<GradingJob>;
    // 通过任务 ID 获取
    async fn get_grading_job(&self, job_id: &str) -> Result<Option<GradingJob>>;
    // 列出作业的批改任务（新的在前）
    async fn list_grading_jobs(&self, assignment_id: i64) -> Result<Vec<GradingJob>>;
    // 推进任务状态（CAS），返回是否写入成功
    async fn transition_grading_job(&self, transition: JobTransition) -> Result<bool>;
    // 在同一事务中完成任务并写回分数；任务 CAS 失败返回 None，否则返回实际批改数
    async fn complete_grading_job(
        &self,
        transition: JobTransition,
        target_statuses: &[SubmissionStatus],
        grades: Vec<GradeAssignment>,
    ) -> Result<Option<u64>>;
    // 只保留作业最新的 keep 个已完成任务，返回删除数量
    async fn prune_grading_jobs(&self, assignment_id: i64, keep: u64) -> Result<u64>;

    /// 系统
    // 数据库连通性检查
    async fn ping(&self) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
