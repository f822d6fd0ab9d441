//! 批改任务实体
//!
//! `id` 为内部自增序号，用于排序与保留策略；对外暴露的是 `job_id`。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub job_id: String,
    pub assignment_id: i64,
    pub total: i32,
    pub processed: i32,
    pub status: String,
    pub only_ungraded: bool,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_grading_job(self) -> crate::models::grading_jobs::entities::GradingJob {
        use crate::models::grading_jobs::entities::{GradeJobOptions, GradingJob, JobStatus};
        use chrono::{DateTime, Utc};

        GradingJob {
            id: self.job_id,
            assignment_id: self.assignment_id,
            total: self.total,
            processed: self.processed,
            status: self.status.parse().unwrap_or(JobStatus::Queued),
            created_at: DateTime::<Utc>::from_timestamp_millis(self.created_at).unwrap_or_default(),
            completed_at: self
                .completed_at
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            options: GradeJobOptions {
                only_ungraded: self.only_ungraded,
            },
        }
    }
}
