//! 作业存储操作

use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::grading_jobs::{Column as GradingJobColumn, Entity as GradingJobs};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{GradingError, Result};
use crate::models::assignments::{
    entities::{Assignment, AssignmentStatus},
    requests::CreateAssignmentRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(&self, req: CreateAssignmentRequest) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();
        let status = req.status.unwrap_or(AssignmentStatus::Draft);

        let model = ActiveModel {
            class_id: Set(req.class_id),
            title: Set(req.title),
            knowledge: Set(req.knowledge),
            status: Set(status.to_string()),
            due_at: Set(req.due_at.map(|dt| dt.timestamp())),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 列出作业（按创建顺序）
    pub async fn list_assignments_impl(&self, class_id: Option<i64>) -> Result<Vec<Assignment>> {
        let mut select = Assignments::find();

        if let Some(class_id) = class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }

        let assignments = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(assignments
            .into_iter()
            .map(|m| m.into_assignment())
            .collect())
    }

    /// 删除作业及其提交、批改任务
    pub async fn delete_assignment_impl(&self, assignment_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        Submissions::delete_many()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("删除作业提交失败: {e}")))?;

        GradingJobs::delete_many()
            .filter(GradingJobColumn::AssignmentId.eq(assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("删除批改任务失败: {e}")))?;

        let result = Assignments::delete_by_id(assignment_id)
            .exec(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("删除作业失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::assignments::{
        entities::AssignmentStatus, requests::CreateAssignmentRequest,
    };
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::submissions::entities::{NewSubmission, SubmissionStatus};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::tests::memory_storage;

    #[tokio::test]
    async fn test_delete_assignment_cascades_submissions() {
        let storage = memory_storage().await;
        let class = storage
            .create_class(CreateClassRequest {
                name: "一班".to_string(),
            })
            .await
            .unwrap();
        let assignment = storage
            .create_assignment(CreateAssignmentRequest {
                class_id: class.id,
                title: "二次函数".to_string(),
                knowledge: None,
                status: Some(AssignmentStatus::Published),
                due_at: None,
            })
            .await
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Published);

        let created = storage
            .create_submissions(
                assignment.id,
                vec![NewSubmission {
                    student_id: 1,
                    name: "张三".to_string(),
                    email: "zhangsan@example.com".to_string(),
                    status: SubmissionStatus::Pending,
                    submitted_at: None,
                }],
            )
            .await
            .unwrap();
        assert_eq!(created, 1);

        assert!(storage.delete_assignment(assignment.id).await.unwrap());
        assert!(
            storage
                .get_assignment_by_id(assignment.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            storage
                .list_submissions(assignment.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(!storage.delete_assignment(assignment.id).await.unwrap());
    }
}
