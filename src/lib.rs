//! Service Reviver - 定时健康检测与自动恢复工具
//!
//! 按固定间隔探测一组网站，能取回页面元数据即视为健康，
//! 否则以目标名称为参数执行配置的恢复命令：
//! - HTTP/HTTPS页面探测与元数据提取
//! - 失败目标的恢复命令触发
//! - JSON/TOML配置与环境变量替换
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod probe;
pub mod recovery;
pub mod service;

// 重新导出主要类型
pub use config::{Config, GlobalConfig, TargetConfig};
pub use error::ReviverError;
pub use health::{CheckOutcome, CheckReport, CheckScheduler, HealthEvaluator, PassSummary};
pub use probe::{HttpProbeClient, PageMetadata, Probe};
pub use recovery::{CommandRecoveryTrigger, RecoveryTrigger};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
