//! 批改任务存储操作
//!
//! 任务推进全部采用条件更新（CAS）：只有当记录仍处于调用方读取到的
//! `status`/`processed` 时才写入，并发推进中落后的一方写入 0 行。

use super::SeaOrmStorage;
use crate::entity::grading_jobs::{ActiveModel, Column, Entity as GradingJobs};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{GradingError, Result};
use crate::models::grading_jobs::entities::{
    GradeAssignment, GradingJob, JobStatus, JobTransition,
};
use crate::models::submissions::entities::SubmissionStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, UpdateMany,
};

impl SeaOrmStorage {
    /// 创建批改任务
    pub async fn create_grading_job_impl(&self, job: GradingJob) -> Result<GradingJob> {
        let model = ActiveModel {
            job_id: Set(job.id),
            assignment_id: Set(job.assignment_id),
            total: Set(job.total),
            processed: Set(job.processed),
            status: Set(job.status.to_string()),
            only_ungraded: Set(job.options.only_ungraded),
            created_at: Set(job.created_at.timestamp_millis()),
            completed_at: Set(job.completed_at.map(|dt| dt.timestamp_millis())),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建批改任务失败: {e}")))?;

        Ok(result.into_grading_job())
    }

    /// 通过任务 ID 获取
    pub async fn get_grading_job_impl(&self, job_id: &str) -> Result<Option<GradingJob>> {
        let result = GradingJobs::find()
            .filter(Column::JobId.eq(job_id))
            .one(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询批改任务失败: {e}")))?;

        Ok(result.map(|m| m.into_grading_job()))
    }

    /// 列出作业的批改任务，新的在前
    pub async fn list_grading_jobs_impl(&self, assignment_id: i64) -> Result<Vec<GradingJob>> {
        let jobs = GradingJobs::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                GradingError::database_operation(format!("查询批改任务列表失败: {e}"))
            })?;

        Ok(jobs.into_iter().map(|m| m.into_grading_job()).collect())
    }

    /// 条件推进任务状态
    pub async fn transition_grading_job_impl(&self, transition: JobTransition) -> Result<bool> {
        let rows = Self::transition_statement(&transition)
            .exec(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("更新批改任务失败: {e}")))?
            .rows_affected;

        Ok(rows > 0)
    }

    /// 完成任务并写回分数（单一事务）
    ///
    /// 每条分数写入都以提交当前状态仍满足任务谓词为条件，
    /// 中途被手动修改出谓词范围的提交不受影响。
    pub async fn complete_grading_job_impl(
        &self,
        transition: JobTransition,
        target_statuses: &[SubmissionStatus],
        grades: Vec<GradeAssignment>,
    ) -> Result<Option<u64>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        let rows = Self::transition_statement(&transition)
            .exec(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("更新批改任务失败: {e}")))?
            .rows_affected;

        if rows == 0 {
            txn.rollback()
                .await
                .map_err(|e| GradingError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        let assignment_id = Self::job_assignment_id(&txn, &transition.job_id).await?;
        let statuses: Vec<&str> = target_statuses.iter().map(|s| s.as_str()).collect();
        let now = chrono::Utc::now().timestamp();
        let mut graded = 0;

        for grade in grades {
            let result = Submissions::update_many()
                .col_expr(
                    SubmissionColumn::Status,
                    Expr::value(SubmissionStatus::Graded.to_string()),
                )
                .col_expr(SubmissionColumn::Score, Expr::value(grade.score))
                .col_expr(SubmissionColumn::UpdatedAt, Expr::value(now))
                .filter(SubmissionColumn::Id.eq(grade.submission_id))
                .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
                .filter(SubmissionColumn::Status.is_in(statuses.clone()))
                .exec(&txn)
                .await
                .map_err(|e| GradingError::database_operation(format!("写回分数失败: {e}")))?;
            graded += result.rows_affected;
        }

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(graded))
    }

    /// 删除超出保留数量的已完成任务
    pub async fn prune_grading_jobs_impl(&self, assignment_id: i64, keep: u64) -> Result<u64> {
        let done: Vec<i64> = GradingJobs::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::Status.eq(JobStatus::Done.as_str()))
            .order_by_desc(Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询过期任务失败: {e}")))?;

        let stale: Vec<i64> = done.into_iter().skip(keep as usize).collect();

        if stale.is_empty() {
            return Ok(0);
        }

        let result = GradingJobs::delete_many()
            .filter(Column::Id.is_in(stale))
            .exec(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("清理批改任务失败: {e}")))?;

        Ok(result.rows_affected)
    }

    fn transition_statement(transition: &JobTransition) -> UpdateMany<GradingJobs> {
        GradingJobs::update_many()
            .col_expr(Column::Status, Expr::value(transition.to_status.to_string()))
            .col_expr(Column::Processed, Expr::value(transition.to_processed))
            .col_expr(
                Column::CompletedAt,
                Expr::value(transition.completed_at.map(|dt| dt.timestamp_millis())),
            )
            .filter(Column::JobId.eq(transition.job_id.as_str()))
            .filter(Column::Status.eq(transition.from_status.as_str()))
            .filter(Column::Processed.eq(transition.from_processed))
    }

    async fn job_assignment_id<C: ConnectionTrait>(conn: &C, job_id: &str) -> Result<i64> {
        let assignment_id: Option<i64> = GradingJobs::find()
            .select_only()
            .column(Column::AssignmentId)
            .filter(Column::JobId.eq(job_id))
            .into_tuple()
            .one(conn)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询批改任务失败: {e}")))?;

        assignment_id.ok_or_else(|| GradingError::not_found(format!("批改任务不存在: {job_id}")))
    }
}

#[cfg(test)]
mod tests {
    use crate::models::assignments::requests::CreateAssignmentRequest;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::grading_jobs::entities::{
        GradeJobOptions, GradingJob, JobStatus, JobTransition,
    };
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::memory_storage;

    async fn assignment(storage: &SeaOrmStorage) -> i64 {
        let class = storage
            .create_class(CreateClassRequest {
                name: "一班".to_string(),
            })
            .await
            .unwrap();
        storage
            .create_assignment(CreateAssignmentRequest {
                class_id: class.id,
                title: "作业".to_string(),
                knowledge: None,
                status: None,
                due_at: None,
            })
            .await
            .unwrap()
            .id
    }

    fn job(assignment_id: i64, status: JobStatus, total: i32) -> GradingJob {
        GradingJob {
            id: GradingJob::new_id(),
            assignment_id,
            total,
            processed: if status == JobStatus::Done { total } else { 0 },
            status,
            created_at: chrono::Utc::now(),
            completed_at: None,
            options: GradeJobOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_stale_transition_writes_nothing() {
        let storage = memory_storage().await;
        let assignment_id = assignment(&storage).await;
        let created = storage
            .create_grading_job(job(assignment_id, JobStatus::Queued, 3))
            .await
            .unwrap();

        let start = JobTransition {
            job_id: created.id.clone(),
            from_status: JobStatus::Queued,
            from_processed: 0,
            to_status: JobStatus::Running,
            to_processed: 0,
            completed_at: None,
        };
        assert!(storage.transition_grading_job(start.clone()).await.unwrap());
        // 同一个读取快照的第二次写入落空
        assert!(!storage.transition_grading_job(start).await.unwrap());

        let stored = storage.get_grading_job(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Running);
        assert_eq!(stored.processed, 0);
    }

    #[tokio::test]
    async fn test_prune_keeps_newest_done_jobs() {
        let storage = memory_storage().await;
        let assignment_id = assignment(&storage).await;

        let mut done_ids = Vec::new();
        for _ in 0..4 {
            let created = storage
                .create_grading_job(job(assignment_id, JobStatus::Done, 1))
                .await
                .unwrap();
            done_ids.push(created.id);
        }
        let running = storage
            .create_grading_job(job(assignment_id, JobStatus::Running, 5))
            .await
            .unwrap();

        let removed = storage.prune_grading_jobs(assignment_id, 2).await.unwrap();
        assert_eq!(removed, 2);

        let remaining: Vec<String> = storage
            .list_grading_jobs(assignment_id)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(
            remaining,
            vec![running.id, done_ids[3].clone(), done_ids[2].clone()]
        );
    }
}
