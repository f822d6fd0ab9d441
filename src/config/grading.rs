use std::ops::RangeInclusive;

use config::ConfigError;
use serde::{Deserialize, Serialize};

use crate::utils::validate::SCORE_RANGE;

/// 批改引擎参数，对应配置文件的 `[grading]` 段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    /// 建议客户端使用的轮询间隔（毫秒），引擎本身不依赖
    pub poll_interval_ms: u64,
    pub step_min: u32,
    pub step_max: u32,
    pub score_min: i32,
    pub score_max: i32,
    /// 每个作业保留的已完成任务数
    pub max_jobs_per_assignment: u64,
    /// 生成提交种子时学生已提交的概率
    pub submitted_ratio: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1200,
            step_min: 1,
            step_max: 5,
            score_min: 60,
            score_max: 100,
            max_jobs_per_assignment: 20,
            submitted_ratio: 0.6,
        }
    }
}

impl GradingConfig {
    /// 每次推进的进度步长，两端都包含
    pub fn step_range(&self) -> RangeInclusive<u32> {
        self.step_min..=self.step_max
    }

    /// 随机评分区间，两端都包含
    pub fn score_range(&self) -> RangeInclusive<i32> {
        self.score_min..=self.score_max
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_min == 0 || self.step_range().is_empty() {
            return Err(ConfigError::Message(format!(
                "grading.step_min/step_max 无效: {:?}",
                self.step_range()
            )));
        }
        if !SCORE_RANGE.contains(&self.score_min)
            || !SCORE_RANGE.contains(&self.score_max)
            || self.score_range().is_empty()
        {
            return Err(ConfigError::Message(format!(
                "grading.score_min/score_max 必须落在 [0, 100]: {:?}",
                self.score_range()
            )));
        }
        if !(0.0..=1.0).contains(&self.submitted_ratio) {
            return Err(ConfigError::Message(format!(
                "grading.submitted_ratio 必须在 [0, 1] 之间: {}",
                self.submitted_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grading_config_is_valid() {
        let grading = GradingConfig::default();
        assert!(grading.validate().is_ok());
        assert_eq!(grading.step_range(), 1..=5);
        assert_eq!(grading.score_range(), 60..=100);
    }

    #[test]
    fn test_inverted_or_out_of_bounds_ranges_rejected() {
        let cases = [
            GradingConfig {
                step_min: 6,
                ..GradingConfig::default()
            },
            GradingConfig {
                step_min: 0,
                ..GradingConfig::default()
            },
            GradingConfig {
                score_min: 90,
                score_max: 80,
                ..GradingConfig::default()
            },
            GradingConfig {
                score_max: 120,
                ..GradingConfig::default()
            },
            GradingConfig {
                submitted_ratio: 1.5,
                ..GradingConfig::default()
            },
        ];
        for case in cases {
            assert!(case.validate().is_err(), "{case:?}");
        }
    }
}
