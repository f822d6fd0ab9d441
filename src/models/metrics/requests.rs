use serde::Deserialize;
use ts_rs::TS;

/// 表示“全部作业”的哨兵值
pub const ALL_ASSIGNMENTS: &str = "__ALL__";

/// 统计查询参数（HTTP 请求）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/metrics.ts")]
pub struct MetricsParams {
    pub class_id: Option<i64>,
    /// 作业 ID，或 `__ALL__` 表示全部
    pub assignment_id: Option<String>,
}

/// 解析后的统计过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MetricsFilter {
    pub class_id: Option<i64>,
    pub assignment_id: Option<i64>,
}

impl MetricsFilter {
    /// 缓存键
    pub fn cache_key(&self) -> String {
        let part = |v: Option<i64>| v.map(|id| id.to_string()).unwrap_or_else(|| "*".into());
        format!(
            "metrics:class:{}:assignment:{}",
            part(self.class_id),
            part(self.assignment_id)
        )
    }
}

impl TryFrom<MetricsParams> for MetricsFilter {
    type Error = String;

    fn try_from(params: MetricsParams) -> Result<Self, Self::Error> {
        let assignment_id = match params.assignment_id.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_ASSIGNMENTS) => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| format!("无效的作业 ID: '{raw}'"))?,
            ),
        };
        Ok(Self {
            class_id: params.class_id,
            assignment_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentinel_means_no_assignment_filter() {
        let filter = MetricsFilter::try_from(MetricsParams {
            class_id: Some(3),
            assignment_id: Some(ALL_ASSIGNMENTS.to_string()),
        })
        .unwrap();
        assert_eq!(filter.class_id, Some(3));
        assert_eq!(filter.assignment_id, None);
    }

    #[test]
    fn test_numeric_assignment_is_parsed() {
        let filter = MetricsFilter::try_from(MetricsParams {
            class_id: None,
            assignment_id: Some(" 42 ".to_string()),
        })
        .unwrap();
        assert_eq!(filter.assignment_id, Some(42));
    }

    #[test]
    fn test_garbage_assignment_is_rejected() {
        let result = MetricsFilter::try_from(MetricsParams {
            class_id: None,
            assignment_id: Some("abc".to_string()),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_key_distinguishes_filters() {
        let a = MetricsFilter::default().cache_key();
        let b = MetricsFilter {
            class_id: Some(1),
            assignment_id: None,
        }
        .cache_key();
        assert_ne!(a, b);
        assert_eq!(a, "metrics:class:*:assignment:*");
    }
}
