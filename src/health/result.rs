//! 健康检测结果数据结构
//!
//! 定义单个目标的检测结论和一轮检测的汇总

use crate::recovery::RecoveryReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// 检测结论
///
/// 只区分探测是否完成，与页面内容无关
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckOutcome {
    /// 探测成功完成
    Healthy,
    /// 探测失败
    Unhealthy {
        /// 失败原因
        reason: String,
    },
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::Healthy => write!(f, "正常"),
            CheckOutcome::Unhealthy { .. } => write!(f, "异常"),
        }
    }
}

impl CheckOutcome {
    /// 判断是否健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, CheckOutcome::Healthy)
    }

    /// 失败原因
    pub fn reason(&self) -> Option<&str> {
        match self {
            CheckOutcome::Healthy => None,
            CheckOutcome::Unhealthy { reason } => Some(reason),
        }
    }
}

/// 单个目标的检测报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// 目标名称
    pub target: String,
    /// 目标URL
    pub url: String,
    /// 检测结论
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    /// 探测耗时
    #[serde(with = "duration_serde", rename = "elapsed_ms")]
    pub elapsed: Duration,
    /// 检测时间戳
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    /// 创建新的检测报告
    pub fn new(target: String, url: String, outcome: CheckOutcome, elapsed: Duration) -> Self {
        Self {
            target,
            url,
            outcome,
            elapsed,
            checked_at: Utc::now(),
        }
    }

    /// 获取耗时（毫秒）
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// 一轮检测的汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassSummary {
    /// 本轮ID，用于关联日志
    pub pass_id: Uuid,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 各目标的检测报告，顺序与配置一致
    pub reports: Vec<CheckReport>,
    /// 成功启动的恢复命令数
    pub recoveries_triggered: usize,
    /// 启动失败的恢复命令数
    pub recovery_failures: usize,
    /// 在本轮内等到结束的恢复命令结果
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovery_reports: Vec<RecoveryReport>,
    /// 因上一轮仍在进行而跳过
    pub skipped: bool,
}

impl PassSummary {
    /// 创建空的汇总
    pub fn new() -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            started_at: Utc::now(),
            reports: Vec::new(),
            recoveries_triggered: 0,
            recovery_failures: 0,
            recovery_reports: Vec::new(),
            skipped: false,
        }
    }

    /// 被跳过的一轮
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::new()
        }
    }

    /// 检测的目标总数
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// 健康目标数
    pub fn healthy(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_healthy()).count()
    }

    /// 不健康目标数
    pub fn unhealthy(&self) -> usize {
        self.total() - self.healthy()
    }

    /// 是否全部健康
    pub fn all_healthy(&self) -> bool {
        self.unhealthy() == 0
    }
}

impl Default for PassSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration序列化模块
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, outcome: CheckOutcome) -> CheckReport {
        CheckReport::new(
            name.to_string(),
            format!("https://{name}.example.com"),
            outcome,
            Duration::from_millis(120),
        )
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(CheckOutcome::Healthy.is_healthy());
        assert_eq!(CheckOutcome::Healthy.reason(), None);

        let down = CheckOutcome::Unhealthy {
            reason: "timeout".to_string(),
        };
        assert!(!down.is_healthy());
        assert_eq!(down.reason(), Some("timeout"));
        assert_eq!(down.to_string(), "异常");
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = PassSummary::new();
        summary.reports.push(report("a", CheckOutcome::Healthy));
        summary.reports.push(report(
            "b",
            CheckOutcome::Unhealthy {
                reason: "refused".to_string(),
            },
        ));
        summary.reports.push(report("c", CheckOutcome::Healthy));

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.healthy(), 2);
        assert_eq!(summary.unhealthy(), 1);
        assert!(!summary.all_healthy());
        assert!(!summary.skipped);
    }

    #[test]
    fn test_skipped_summary_is_empty() {
        let summary = PassSummary::skipped();
        assert!(summary.skipped);
        assert_eq!(summary.total(), 0);
        assert!(summary.all_healthy());
    }

    #[test]
    fn test_report_json_shape() {
        let report = report(
            "api",
            CheckOutcome::Unhealthy {
                reason: "refused".to_string(),
            },
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["target"], "api");
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["reason"], "refused");
        assert_eq!(json["elapsed_ms"], 120);
        assert_eq!(report.elapsed_ms(), 120);
    }
}
