//! 批改任务引擎
//!
//! 任务没有后台线程，进度只在调用方轮询 [`GradingEngine::advance`] 时推进：
//!
//! - `queued`  → `running`，进度不变（目标数为 0 的任务直接完成）
//! - `running` → 进度增加 `[step_min, step_max]` 内的随机步长，封顶 `total`；
//!   达到 `total` 时转为 `done` 并写回分数
//! - `done`    → 不做任何修改
//!
//! 完成时按任务谓词重新读取当前的提交，而不是创建时的快照；
//! 中途被改出谓词范围的提交保持原样。
//!
//! 同一任务的推进在进程内由 per-job 互斥锁串行化，
//! 跨进程由存储层的条件更新兜底。

use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::grader::{Grader, RandomGrader};
use crate::config::GradingConfig;
use crate::errors::{GradingError, Result};
use crate::models::grading_jobs::entities::{
    GradeAssignment, GradeJobOptions, GradingJob, JobStatus, JobTransition,
};
use crate::models::submissions::entities::{Submission, SubmissionStatus, SubmissionUpdate};
use crate::storage::Storage;
use crate::utils::validate::SCORE_RANGE;

/// 一次推进的结果
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub job: GradingJob,
    /// 本次调用是否把任务推进到了 done（调用方据此失效统计缓存）
    pub completed_now: bool,
}

pub struct GradingEngine {
    storage: Arc<dyn Storage>,
    grader: Arc<dyn Grader>,
    config: GradingConfig,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GradingEngine {
    pub fn new(storage: Arc<dyn Storage>, config: GradingConfig) -> Self {
        let grader = Arc::new(RandomGrader::from_config(&config));
        Self::with_grader(storage, grader, config)
    }

    pub fn with_grader(
        storage: Arc<dyn Storage>,
        grader: Arc<dyn Grader>,
        config: GradingConfig,
    ) -> Self {
        Self {
            storage,
            grader,
            config,
            locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// 创建批改任务；作业不存在时返回 `None`
    pub async fn create_job(
        &self,
        assignment_id: i64,
        options: GradeJobOptions,
    ) -> Result<Option<GradingJob>> {
        if self
            .storage
            .get_assignment_by_id(assignment_id)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let submissions = self.storage.list_submissions(assignment_id).await?;
        let total = submissions
            .iter()
            .filter(|s| options.matches(s.status))
            .count() as i32;

        let job = self
            .storage
            .create_grading_job(GradingJob {
                id: GradingJob::new_id(),
                assignment_id,
                total,
                processed: 0,
                status: JobStatus::Queued,
                created_at: chrono::Utc::now(),
                completed_at: None,
                options,
            })
            .await?;

        info!(
            "Grading job {} created for assignment {} (total: {}, only_ungraded: {})",
            job.id, assignment_id, total, options.only_ungraded
        );

        let pruned = self
            .storage
            .prune_grading_jobs(assignment_id, self.config.max_jobs_per_assignment)
            .await?;
        if pruned > 0 {
            debug!(
                "Pruned {} finished grading jobs of assignment {}",
                pruned, assignment_id
            );
        }

        Ok(Some(job))
    }

    /// 推进任务一步；任务不存在时返回 `None`
    pub async fn advance(&self, job_id: &str) -> Result<Option<AdvanceOutcome>> {
        let lock = self.job_lock(job_id);
        let result = {
            let _guard = lock.lock().await;
            self.advance_locked(job_id).await
        };
        drop(lock);
        // 没有其他轮询者持有时回收锁，放弃轮询的任务也不会留下条目
        self.locks
            .remove_if(job_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn advance_locked(&self, job_id: &str) -> Result<Option<AdvanceOutcome>> {
        let Some(job) = self.storage.get_grading_job(job_id).await? else {
            return Ok(None);
        };

        let outcome = match job.status {
            JobStatus::Done => AdvanceOutcome {
                job,
                completed_now: false,
            },
            JobStatus::Queued if job.total == 0 => self.complete(job).await?,
            JobStatus::Queued => self.transition(job, JobStatus::Running, 0).await?,
            JobStatus::Running => {
                let processed = (job.processed + self.next_step()).min(job.total);
                if processed >= job.total {
                    self.complete(job).await?
                } else {
                    self.transition(job, JobStatus::Running, processed).await?
                }
            }
        };

        Ok(Some(outcome))
    }

    /// 单条提交立即重新评分，不经过任务注册表；提交不存在时返回 `None`
    pub async fn regrade_one(
        &self,
        assignment_id: i64,
        submission_id: i64,
    ) -> Result<Option<Submission>> {
        let Some(submission) = self
            .storage
            .get_submission(assignment_id, submission_id)
            .await?
        else {
            return Ok(None);
        };

        let score = self.grade(&submission).await?;
        let updated = self
            .storage
            .update_submission(
                assignment_id,
                submission_id,
                SubmissionUpdate {
                    status: SubmissionStatus::Graded,
                    score: Some(score),
                    submitted_at: submission.submitted_at.or_else(|| Some(chrono::Utc::now())),
                    feedback: submission.feedback.clone(),
                    expected_status: None,
                },
            )
            .await?;

        debug!(
            "Submission {} of assignment {} regraded: {}",
            submission_id, assignment_id, score
        );
        Ok(updated)
    }

    /// 作业的批改任务，新的在前
    pub async fn list_jobs(&self, assignment_id: i64) -> Result<Vec<GradingJob>> {
        self.storage.list_grading_jobs(assignment_id).await
    }

    async fn transition(
        &self,
        job: GradingJob,
        to_status: JobStatus,
        to_processed: i32,
    ) -> Result<AdvanceOutcome> {
        let written = self
            .storage
            .transition_grading_job(JobTransition {
                job_id: job.id.clone(),
                from_status: job.status,
                from_processed: job.processed,
                to_status,
                to_processed,
                completed_at: None,
            })
            .await?;

        if !written {
            return self.reload_after_lost_race(job).await;
        }

        debug!(
            "Grading job {} advanced: {} {}/{} -> {} {}/{}",
            job.id, job.status, job.processed, job.total, to_status, to_processed, job.total
        );

        Ok(AdvanceOutcome {
            job: GradingJob {
                status: to_status,
                processed: to_processed,
                ..job
            },
            completed_now: false,
        })
    }

    async fn complete(&self, job: GradingJob) -> Result<AdvanceOutcome> {
        // 完成时按谓词重新读取当前提交
        let submissions = self.storage.list_submissions(job.assignment_id).await?;
        let mut grades = Vec::new();
        for submission in submissions
            .iter()
            .filter(|s| job.options.matches(s.status))
        {
            grades.push(GradeAssignment {
                submission_id: submission.id,
                score: self.grade(submission).await?,
            });
        }

        let completed_at = chrono::Utc::now();
        let graded = self
            .storage
            .complete_grading_job(
                JobTransition {
                    job_id: job.id.clone(),
                    from_status: job.status,
                    from_processed: job.processed,
                    to_status: JobStatus::Done,
                    to_processed: job.total,
                    completed_at: Some(completed_at),
                },
                job.options.target_statuses(),
                grades,
            )
            .await?;

        let Some(graded) = graded else {
            return self.reload_after_lost_race(job).await;
        };

        info!(
            "Grading job {} completed for assignment {} (total: {}, graded: {})",
            job.id, job.assignment_id, job.total, graded
        );

        Ok(AdvanceOutcome {
            job: GradingJob {
                status: JobStatus::Done,
                processed: job.total,
                completed_at: Some(completed_at),
                ..job
            },
            completed_now: true,
        })
    }

    /// 条件写入落空：别的写者已推进过该任务，返回存储中的最新状态
    async fn reload_after_lost_race(&self, job: GradingJob) -> Result<AdvanceOutcome> {
        warn!(
            "Grading job {} was advanced concurrently (expected {} {}/{})",
            job.id, job.status, job.processed, job.total
        );
        let current = self
            .storage
            .get_grading_job(&job.id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("批改任务不存在: {}", job.id)))?;
        Ok(AdvanceOutcome {
            job: current,
            completed_now: false,
        })
    }

    async fn grade(&self, submission: &Submission) -> Result<i32> {
        let score = self.grader.grade(submission).await?;
        if !SCORE_RANGE.contains(&score) {
            return Err(GradingError::grader(format!(
                "评分结果超出范围: 提交 {} 得分 {score}",
                submission.id
            )));
        }
        Ok(score)
    }

    fn next_step(&self) -> i32 {
        rand::rng().random_range(self.config.step_range()) as i32
    }

    fn job_lock(&self, job_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(job_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::requests::CreateAssignmentRequest;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::submissions::entities::NewSubmission;
    use crate::storage::sea_orm_storage::tests::memory_storage;
    use async_trait::async_trait;

    struct FixedGrader(i32);

    #[async_trait]
    impl Grader for FixedGrader {
        async fn grade(&self, _submission: &Submission) -> Result<i32> {
            Ok(self.0)
        }
    }

    async fn storage_with(statuses: &[SubmissionStatus]) -> (Arc<dyn Storage>, i64) {
        let storage: Arc<dyn Storage> = Arc::new(memory_storage().await);
        let class = storage
            .create_class(CreateClassRequest {
                name: "一班".to_string(),
            })
            .await
            .unwrap();
        let assignment = storage
            .create_assignment(CreateAssignmentRequest {
                class_id: class.id,
                title: "作业一".to_string(),
                knowledge: None,
                status: None,
                due_at: None,
            })
            .await
            .unwrap();
        let submissions = statuses
            .iter()
            .enumerate()
            .map(|(idx, status)| NewSubmission {
                student_id: idx as i64 + 1,
                name: format!("学生{idx}"),
                email: format!("s{idx}@example.com"),
                status: *status,
                submitted_at: status.carries_submitted_at().then(chrono::Utc::now),
            })
            .collect();
        storage
            .create_submissions(assignment.id, submissions)
            .await
            .unwrap();
        (storage, assignment.id)
    }

    /// 三条提交：submitted、submitted、graded(70)
    async fn scenario_store() -> (Arc<dyn Storage>, i64) {
        let (storage, assignment_id) = storage_with(&[
            SubmissionStatus::Submitted,
            SubmissionStatus::Submitted,
            SubmissionStatus::Graded,
        ])
        .await;
        let graded = storage.list_submissions(assignment_id).await.unwrap()[2].clone();
        storage
            .update_submission(
                assignment_id,
                graded.id,
                SubmissionUpdate {
                    status: SubmissionStatus::Graded,
                    score: Some(70),
                    submitted_at: graded.submitted_at,
                    feedback: None,
                    expected_status: None,
                },
            )
            .await
            .unwrap();
        (storage, assignment_id)
    }

    async fn run_to_done(engine: &GradingEngine, job_id: &str) -> Vec<AdvanceOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..100 {
            let outcome = engine.advance(job_id).await.unwrap().unwrap();
            let done = outcome.job.is_done();
            outcomes.push(outcome);
            if done {
                return outcomes;
            }
        }
        panic!("job {job_id} did not finish");
    }

    #[tokio::test]
    async fn test_only_ungraded_job_leaves_existing_grade() {
        let (storage, assignment_id) = scenario_store().await;
        let engine = GradingEngine::new(storage.clone(), GradingConfig::default());

        let job = engine
            .create_job(assignment_id, GradeJobOptions { only_ungraded: true })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.total, 2);
        assert_eq!(job.status, JobStatus::Queued);

        run_to_done(&engine, &job.id).await;

        let submissions = storage.list_submissions(assignment_id).await.unwrap();
        assert!(
            submissions
                .iter()
                .all(|s| s.status == SubmissionStatus::Graded)
        );
        for s in &submissions[..2] {
            let score = s.score.unwrap();
            assert!((60..=100).contains(&score));
        }
        assert_eq!(submissions[2].score, Some(70));
    }

    #[tokio::test]
    async fn test_regrade_job_overwrites_every_score() {
        let (storage, assignment_id) = scenario_store().await;
        let engine = GradingEngine::with_grader(
            storage.clone(),
            Arc::new(FixedGrader(95)),
            GradingConfig::default(),
        );

        let job = engine
            .create_job(
                assignment_id,
                GradeJobOptions {
                    only_ungraded: false,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.total, 3);

        run_to_done(&engine, &job.id).await;

        let submissions = storage.list_submissions(assignment_id).await.unwrap();
        assert!(submissions.iter().all(|s| s.score == Some(95)));
        assert!(
            submissions
                .iter()
                .all(|s| s.status == SubmissionStatus::Graded)
        );
    }

    #[tokio::test]
    async fn test_abandoned_job_leaves_no_lock_behind() {
        let statuses = vec![SubmissionStatus::Submitted; 40];
        let (storage, assignment_id) = storage_with(&statuses).await;
        let engine = GradingEngine::new(storage, GradingConfig::default());
        let job = engine
            .create_job(assignment_id, GradeJobOptions::default())
            .await
            .unwrap()
            .unwrap();

        // 推进两步后不再轮询，任务停在 running
        engine.advance(&job.id).await.unwrap().unwrap();
        let outcome = engine.advance(&job.id).await.unwrap().unwrap();
        assert_eq!(outcome.job.status, JobStatus::Running);
        assert!(engine.locks.is_empty());

        assert!(engine.advance("job_missing").await.unwrap().is_none());
        assert!(engine.locks.is_empty());
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_done_iff_complete() {
        let statuses = vec![SubmissionStatus::Submitted; 17];
        let (storage, assignment_id) = storage_with(&statuses).await;
        let engine = GradingEngine::new(storage, GradingConfig::default());
        let job = engine
            .create_job(assignment_id, GradeJobOptions::default())
            .await
            .unwrap()
            .unwrap();

        let outcomes = run_to_done(&engine, &job.id).await;

        // 第一次推进只进入 running
        assert_eq!(outcomes[0].job.status, JobStatus::Running);
        assert_eq!(outcomes[0].job.processed, 0);

        let mut last = (JobStatus::Queued, 0);
        for outcome in &outcomes {
            let current = (outcome.job.status, outcome.job.processed);
            assert!(current.0 >= last.0);
            assert!(current.1 >= last.1);
            assert!(current.1 - last.1 <= 5);
            assert_eq!(current.1 == 17, current.0 == JobStatus::Done);
            last = current;
        }
        assert_eq!(
            outcomes.iter().filter(|o| o.completed_now).count(),
            1,
            "exactly one advance completes the job"
        );

        // done 之后保持不变
        let again = engine.advance(&job.id).await.unwrap().unwrap();
        assert!(!again.completed_now);
        assert_eq!(again.job.processed, 17);
        assert!(again.job.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_submission_edited_mid_flight_is_untouched() {
        let (storage, assignment_id) =
            storage_with(&[SubmissionStatus::Submitted, SubmissionStatus::Submitted]).await;
        let engine = GradingEngine::with_grader(
            storage.clone(),
            Arc::new(FixedGrader(88)),
            GradingConfig::default(),
        );
        let job = engine
            .create_job(assignment_id, GradeJobOptions::default())
            .await
            .unwrap()
            .unwrap();
        engine.advance(&job.id).await.unwrap();

        // 任务运行中，老师把第一条改回 pending
        let first = storage.list_submissions(assignment_id).await.unwrap()[0].clone();
        storage
            .update_submission(
                assignment_id,
                first.id,
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

        run_to_done(&engine, &job.id).await;

        let submissions = storage.list_submissions(assignment_id).await.unwrap();
        assert_eq!(submissions[0].status, SubmissionStatus::Pending);
        assert_eq!(submissions[0].score, None);
        assert_eq!(submissions[1].status, SubmissionStatus::Graded);
        assert_eq!(submissions[1].score, Some(88));
    }

    #[tokio::test]
    async fn test_zero_target_job_finishes_on_first_advance() {
        let (storage, assignment_id) = storage_with(&[SubmissionStatus::Pending]).await;
        let engine = GradingEngine::new(storage.clone(), GradingConfig::default());
        let job = engine
            .create_job(assignment_id, GradeJobOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.total, 0);

        let outcome = engine.advance(&job.id).await.unwrap().unwrap();
        assert!(outcome.completed_now);
        assert_eq!(outcome.job.status, JobStatus::Done);
        assert_eq!(outcome.job.processed, 0);

        let untouched = storage.list_submissions(assignment_id).await.unwrap();
        assert_eq!(untouched[0].status, SubmissionStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (storage, assignment_id) = storage_with(&[]).await;
        let engine = GradingEngine::new(storage, GradingConfig::default());

        assert!(engine.advance("job_missing").await.unwrap().is_none());
        assert!(
            engine
                .create_job(assignment_id + 100, GradeJobOptions::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            engine
                .regrade_one(assignment_id, 12345)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_concurrent_advances_complete_once() {
        let statuses = vec![SubmissionStatus::Submitted; 6];
        let (storage, assignment_id) = storage_with(&statuses).await;
        let engine = Arc::new(GradingEngine::new(storage, GradingConfig::default()));
        let job = engine
            .create_job(assignment_id, GradeJobOptions::default())
            .await
            .unwrap()
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..40 {
            let engine = engine.clone();
            let job_id = job.id.clone();
            handles.push(tokio::spawn(async move {
                engine.advance(&job_id).await.unwrap().unwrap()
            }));
        }

        let mut completions = 0;
        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(outcome.job.processed <= outcome.job.total);
            if outcome.completed_now {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);

        let stored = engine.advance(&job.id).await.unwrap().unwrap().job;
        assert!(stored.is_done());
        assert_eq!(stored.processed, 6);
    }

    #[tokio::test]
    async fn test_regrade_one_sets_graded_score() {
        let (storage, assignment_id) = storage_with(&[SubmissionStatus::Pending]).await;
        let engine = GradingEngine::with_grader(
            storage.clone(),
            Arc::new(FixedGrader(77)),
            GradingConfig::default(),
        );
        let target = storage.list_submissions(assignment_id).await.unwrap()[0].clone();

        let updated = engine
            .regrade_one(assignment_id, target.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, SubmissionStatus::Graded);
        assert_eq!(updated.score, Some(77));
        assert!(updated.submitted_at.is_some());
        assert!(engine.list_jobs(assignment_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_grader_is_rejected() {
        let (storage, assignment_id) = storage_with(&[SubmissionStatus::Submitted]).await;
        let engine = GradingEngine::with_grader(
            storage.clone(),
            Arc::new(FixedGrader(140)),
            GradingConfig::default(),
        );
        let target = storage.list_submissions(assignment_id).await.unwrap()[0].clone();

        let err = engine.regrade_one(assignment_id, target.id).await.unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[tokio::test]
    async fn test_job_history_is_pruned() {
        let (storage, assignment_id) = storage_with(&[]).await;
        let config = GradingConfig {
            max_jobs_per_assignment: 2,
            ..GradingConfig::default()
        };
        let engine = GradingEngine::new(storage, config);

        for _ in 0..4 {
            let job = engine
                .create_job(assignment_id, GradeJobOptions::default())
                .await
                .unwrap()
                .unwrap();
            run_to_done(&engine, &job.id).await;
        }
        // 第 5 个任务创建时清理，只留最新 2 个已完成的
        let latest = engine
            .create_job(assignment_id, GradeJobOptions::default())
            .await
            .unwrap()
            .unwrap();

        let jobs = engine.list_jobs(assignment_id).await.unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].id, latest.id);
        assert!(jobs[1..].iter().all(|j| j.is_done()));
    }
}
