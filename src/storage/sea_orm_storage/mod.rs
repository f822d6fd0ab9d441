//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod classes;
mod grading_jobs;
mod students;
mod submissions;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{GradingError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// 从配置的 `database.url` 推断出的连接目标
#[derive(Debug, PartialEq, Eq)]
enum DbTarget {
    /// 内存库每个连接都是独立的库，只能用单连接
    SqliteMemory,
    SqliteFile(String),
    Server(String),
}

impl DbTarget {
    fn parse(url: &str) -> Result<Self> {
        const SERVER_SCHEMES: [&str; 4] = ["postgres://", "postgresql://", "mysql://", "mariadb://"];

        if url == ":memory:" || url.starts_with("sqlite::memory:") {
            Ok(DbTarget::SqliteMemory)
        } else if url.starts_with("sqlite:") {
            Ok(DbTarget::SqliteFile(url.to_string()))
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(DbTarget::SqliteFile(format!("sqlite://{url}?mode=rwc")))
        } else if SERVER_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            Ok(DbTarget::Server(url.to_string()))
        } else {
            Err(GradingError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database).await
    }

    /// 连接数据库并把表结构迁移到最新
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let target = DbTarget::parse(&config.url)?;
        let db = match &target {
            DbTarget::SqliteMemory => Self::open_sqlite("sqlite::memory:", 1, config).await?,
            DbTarget::SqliteFile(url) => Self::open_sqlite(url, config.pool_size, config).await?,
            DbTarget::Server(url) => Self::open_server(url, config).await?,
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| GradingError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("Storage ready on {:?}", target);
        Ok(Self { db })
    }

    async fn open_sqlite(
        url: &str,
        max_connections: u32,
        config: &DatabaseConfig,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        // 级联删除依赖外键约束
        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradingError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.timeout));

        if max_connections > 1 {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.timeout))
            // 内存库的连接一旦回收数据就没了
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| GradingError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    async fn open_server(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .sqlx_logging(false);

        Database::connect(options)
            .await
            .map_err(|e| GradingError::database_connection(format!("无法连接到数据库: {e}")))
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 班级模块
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn list_classes(&self) -> Result<Vec<Class>> {
        self.list_classes_impl().await
    }

    // 学生模块
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn list_students(&self, class_id: Option<i64>) -> Result<Vec<Student>> {
        self.list_students_impl(class_id).await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: CreateAssignmentRequest) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(assignment_id).await
    }

    async fn list_assignments(&self, class_id: Option<i64>) -> Result<Vec<Assignment>> {
        self.list_assignments_impl(class_id).await
    }

    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool> {
        self.delete_assignment_impl(assignment_id).await
    }

    // 提交模块
    async fn create_submissions(
        &self,
        assignment_id: i64,
        submissions: Vec<NewSubmission>,
    ) -> Result<i64> {
        self.create_submissions_impl(assignment_id, submissions)
            .await
    }

    async fn list_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>> {
        self.list_submissions_impl(assignment_id).await
    }

    async fn list_submissions_for_assignments(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        self.list_submissions_for_assignments_impl(assignment_ids)
            .await
    }

    async fn list_submissions_with_pagination(
        &self,
        assignment_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        self.list_submissions_with_pagination_impl(assignment_id, query)
            .await
    }

    async fn get_submission(
        &self,
        assignment_id: i64,
        submission_id: i64,
    ) -> Result<Option<Submission>> {
        self.get_submission_impl(assignment_id, submission_id).await
    }

    async fn update_submission(
        &self,
        assignment_id: i64,
        submission_id: i64,
        update: SubmissionUpdate,
    ) -> Result<Option<Submission>> {
        self.update_submission_impl(assignment_id, submission_id, update)
            .await
    }

    // 批改任务模块
    async fn create_grading_job(&self, job: GradingJob) -> Result<GradingJob> {
        self.create_grading_job_impl(job).await
    }

    async fn get_grading_job(&self, job_id: &str) -> Result<Option<GradingJob>> {
        self.get_grading_job_impl(job_id).await
    }

    async fn list_grading_jobs(&self, assignment_id: i64) -> Result<Vec<GradingJob>> {
        self.list_grading_jobs_impl(assignment_id).await
    }

    async fn transition_grading_job(&self, transition: JobTransition) -> Result<bool> {
        self.transition_grading_job_impl(transition).await
    }

    async fn complete_grading_job(
        &self,
        transition: JobTransition,
        target_statuses: &[SubmissionStatus],
        grades: Vec<GradeAssignment>,
    ) -> Result<Option<u64>> {
        self.complete_grading_job_impl(transition, target_statuses, grades)
            .await
    }

    async fn prune_grading_jobs(&self, assignment_id: i64, keep: u64) -> Result<u64> {
        self.prune_grading_jobs_impl(assignment_id, keep).await
    }

    // 系统模块
    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| GradingError::database_connection(format!("数据库不可用: {e}")))
    }
}
