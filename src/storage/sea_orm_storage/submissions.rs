//! 提交存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{GradingError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::MAX_PAGE_SIZE,
    submissions::{
        entities::{NewSubmission, Submission, SubmissionUpdate},
        requests::SubmissionListQuery,
        responses::SubmissionListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 批量创建提交；作业已有提交时直接返回 0
    pub async fn create_submissions_impl(
        &self,
        assignment_id: i64,
        submissions: Vec<NewSubmission>,
    ) -> Result<i64> {
        if submissions.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        let existing = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .count(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询提交总数失败: {e}")))?;

        if existing > 0 {
            txn.rollback()
                .await
                .map_err(|e| GradingError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let created = submissions.len() as i64;
        let models = submissions.into_iter().map(|s| ActiveModel {
            assignment_id: Set(assignment_id),
            student_id: Set(s.student_id),
            name: Set(s.name),
            email: Set(s.email),
            status: Set(s.status.to_string()),
            score: Set(None),
            submitted_at: Set(s.submitted_at.map(|dt| dt.timestamp())),
            feedback: Set(None),
            updated_at: Set(now),
            ..Default::default()
        });

        Submissions::insert_many(models)
            .exec(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建提交失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created)
    }

    /// 列出作业下的全部提交
    pub async fn list_submissions_impl(&self, assignment_id: i64) -> Result<Vec<Submission>> {
        self.list_submissions_for_assignments_impl(&[assignment_id])
            .await
    }

    /// 批量列出多个作业的提交（按作业、ID 排序）
    pub async fn list_submissions_for_assignments_impl(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let submissions = Submissions::find()
            .filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()))
            .order_by_asc(Column::AssignmentId)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(submissions
            .into_iter()
            .map(|m| m.into_submission())
            .collect())
    }

    /// 分页列出提交
    pub async fn list_submissions_with_pagination_impl(
        &self,
        assignment_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        let page = std::cmp::max(query.page, 1) as u64;
        let size = Ord::clamp(query.size, 1, MAX_PAGE_SIZE) as u64;

        let mut select = Submissions::find().filter(Column::AssignmentId.eq(assignment_id));

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        // 关键字筛选（姓名或邮箱，不区分大小写）
        if let Some(ref keyword) = query.keyword {
            let pattern = format!("%{}%", escape_like_pattern(&keyword.to_lowercase()));
            let like = |column: Column| {
                Expr::expr(Func::lower(Expr::col(column)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            select = select.filter(
                Condition::any()
                    .add(like(Column::Name))
                    .add(like(Column::Email)),
            );
        }

        select = select.order_by_asc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GradingError::database_operation(format!("查询提交总数失败: {e}")))?;

        let submissions = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(SubmissionListResponse {
            items: submissions
                .into_iter()
                .map(|m| m.into_submission())
                .collect(),
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 获取单个提交
    pub async fn get_submission_impl(
        &self,
        assignment_id: i64,
        submission_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(submission_id)
            .filter(Column::AssignmentId.eq(assignment_id))
            .one(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 更新提交
    pub async fn update_submission_impl(
        &self,
        assignment_id: i64,
        submission_id: i64,
        update: SubmissionUpdate,
    ) -> Result<Option<Submission>> {
        let now = chrono::Utc::now().timestamp();

        let mut stmt = Submissions::update_many()
            .col_expr(Column::Status, Expr::value(update.status.to_string()))
            .col_expr(Column::Score, Expr::value(update.score))
            .col_expr(
                Column::SubmittedAt,
                Expr::value(update.submitted_at.map(|dt| dt.timestamp())),
            )
            .col_expr(Column::Feedback, Expr::value(update.feedback))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(submission_id))
            .filter(Column::AssignmentId.eq(assignment_id));

        if let Some(expected) = update.expected_status {
            stmt = stmt.filter(Column::Status.eq(expected.as_str()));
        }

        let result = stmt
            .exec(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("更新提交失败: {e}")))?;

        let current = self.get_submission_impl(assignment_id, submission_id).await?;

        if result.rows_affected == 0 {
            return match (current, update.expected_status) {
                (Some(current), Some(expected)) => Err(GradingError::conflict(format!(
                    "提交 {submission_id} 状态已变更为 {}，期望 {expected}",
                    current.status
                ))),
                (current, _) => Ok(current),
            };
        }

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::assignments::requests::CreateAssignmentRequest;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::submissions::entities::{NewSubmission, SubmissionStatus, SubmissionUpdate};
    use crate::models::submissions::requests::SubmissionListQuery;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::memory_storage;

    async fn seeded(storage: &SeaOrmStorage) -> i64 {
        let class = storage
            .create_class(CreateClassRequest {
                name: "一班".to_string(),
            })
            .await
            .unwrap();
        let assignment = storage
            .create_assignment(CreateAssignmentRequest {
                class_id: class.id,
                title: "函数".to_string(),
                knowledge: None,
                status: None,
                due_at: None,
            })
            .await
            .unwrap();
        let people = [
            ("Alice", "alice@example.com", SubmissionStatus::Submitted),
            ("Bob", "bob@school.edu", SubmissionStatus::Pending),
            ("Carol", "CAROL@example.com", SubmissionStatus::Submitted),
        ];
        let new = people
            .iter()
            .enumerate()
            .map(|(idx, (name, email, status))| NewSubmission {
                student_id: idx as i64 + 1,
                name: name.to_string(),
                email: email.to_string(),
                status: *status,
                submitted_at: status
                    .carries_submitted_at()
                    .then(chrono::Utc::now),
            })
            .collect();
        storage.create_submissions(assignment.id, new).await.unwrap();
        assignment.id
    }

    #[tokio::test]
    async fn test_create_submissions_only_once() {
        let storage = memory_storage().await;
        let assignment_id = seeded(&storage).await;

        let again = storage
            .create_submissions(
                assignment_id,
                vec![NewSubmission {
                    student_id: 9,
                    name: "Dave".to_string(),
                    email: "dave@example.com".to_string(),
                    status: SubmissionStatus::Pending,
                    submitted_at: None,
                }],
            )
            .await
            .unwrap();
        assert_eq!(again, 0);
        assert_eq!(storage.list_submissions(assignment_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_with_status_and_keyword() {
        let storage = memory_storage().await;
        let assignment_id = seeded(&storage).await;

        let submitted = storage
            .list_submissions_with_pagination(
                assignment_id,
                SubmissionListQuery {
                    page: 1,
                    size: 10,
                    status: Some(SubmissionStatus::Submitted),
                    keyword: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(submitted.pagination.total, 2);

        let by_email = storage
            .list_submissions_with_pagination(
                assignment_id,
                SubmissionListQuery {
                    page: 1,
                    size: 10,
                    status: None,
                    keyword: Some("example.com".to_string()),
                },
            )
            .await
            .unwrap();
        let names: Vec<_> = by_email.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Carol"]);

        let paged = storage
            .list_submissions_with_pagination(
                assignment_id,
                SubmissionListQuery {
                    page: 2,
                    size: 2,
                    status: None,
                    keyword: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_update_with_stale_expected_status_conflicts() {
        let storage = memory_storage().await;
        let assignment_id = seeded(&storage).await;
        let target = storage.list_submissions(assignment_id).await.unwrap()[1].clone();
        assert_eq!(target.status, SubmissionStatus::Pending);

        let result = storage
            .update_submission(
                assignment_id,
                target.id,
                SubmissionUpdate {
                    status: SubmissionStatus::Graded,
                    score: Some(88),
                    submitted_at: Some(chrono::Utc::now()),
                    feedback: None,
                    expected_status: Some(SubmissionStatus::Submitted),
                },
            )
            .await;
        assert!(result.is_err());

        let missing = storage
            .update_submission(
                assignment_id,
                9999,
                SubmissionUpdate {
                    status: SubmissionStatus::Pending,
                    score: None,
                    submitted_at: None,
                    feedback: None,
                    expected_status: None,
                },
            )
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
