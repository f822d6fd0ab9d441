//! 评分能力
//!
//! 引擎只依赖 [`Grader`]，默认实现按配置区间随机给分；
//! 接入真实评分服务时替换这里的实现即可，轮询协议不变。

use async_trait::async_trait;
use rand::Rng;

use crate::config::GradingConfig;
use crate::errors::Result;
use crate::models::submissions::entities::Submission;

#[async_trait]
pub trait Grader: Send + Sync {
    /// 为单个提交给出 0..=100 的分数
    async fn grade(&self, submission: &Submission) -> Result<i32>;
}

/// 在 `[min, max]` 内均匀随机给分
#[derive(Debug, Clone, Copy)]
pub struct RandomGrader {
    min: i32,
    max: i32,
}

impl RandomGrader {
    pub fn new(min: i32, max: i32) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn from_config(config: &GradingConfig) -> Self {
        let scores = config.score_range();
        Self::new(*scores.start(), *scores.end())
    }
}

#[async_trait]
impl Grader for RandomGrader {
    async fn grade(&self, _submission: &Submission) -> Result<i32> {
        Ok(rand::rng().random_range(self.min..=self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::SubmissionStatus;

    fn submission() -> Submission {
        Submission {
            id: 1,
            assignment_id: 1,
            student_id: 1,
            name: "张三".to_string(),
            email: "zhangsan@example.com".to_string(),
            status: SubmissionStatus::Submitted,
            score: None,
            submitted_at: Some(chrono::Utc::now()),
            feedback: None,
        }
    }

    #[tokio::test]
    async fn test_random_grader_stays_in_range() {
        let grader = RandomGrader::from_config(&GradingConfig::default());
        let target = submission();
        for _ in 0..500 {
            let score = grader.grade(&target).await.unwrap();
            assert!((60..=100).contains(&score), "score {score} out of range");
        }
    }

    #[tokio::test]
    async fn test_degenerate_range() {
        let grader = RandomGrader::new(75, 75);
        assert_eq!(grader.grade(&submission()).await.unwrap(), 75);
    }
}
