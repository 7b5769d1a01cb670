//! 健康检测模块
//!
//! 提供健康评估、结果汇总和检测调度功能

pub mod evaluator;
pub mod result;
pub mod scheduler;

// 重新导出主要类型
pub use evaluator::HealthEvaluator;
pub use result::{CheckOutcome, CheckReport, PassSummary};
pub use scheduler::{CheckScheduler, PassOptions};
