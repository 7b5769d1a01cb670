//! 恢复模块
//!
//! 目标不健康时执行其恢复命令

pub mod trigger;

// 重新导出主要类型
pub use trigger::{CommandRecoveryTrigger, RecoveryHandle, RecoveryReport, RecoveryTrigger};
