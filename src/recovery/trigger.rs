//! 恢复命令触发器
//!
//! 通过系统 shell 执行 `{command} {name}`。子进程启动后立即返回，
//! 由独立任务等待其结束并记录输出。

use crate::config::TargetConfig;
use crate::error::RecoveryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// 恢复命令的执行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// 目标名称
    pub target: String,
    /// 实际执行的命令行
    pub command_line: String,
    /// 是否成功（退出码为0）
    pub success: bool,
    /// 退出码，被信号终止时为 `None`
    pub exit_code: Option<i32>,
    /// 标准输出
    pub stdout: String,
    /// 标准错误
    pub stderr: String,
}

/// 已启动的恢复任务句柄
///
/// 丢弃句柄不会影响子进程，任务会在后台继续运行
#[derive(Debug)]
pub struct RecoveryHandle {
    target: String,
    task: JoinHandle<RecoveryReport>,
}

impl RecoveryHandle {
    /// 包装一个后台任务
    pub fn new(target: impl Into<String>, task: JoinHandle<RecoveryReport>) -> Self {
        Self {
            target: target.into(),
            task,
        }
    }

    /// 用已知结果构造句柄
    pub fn completed(report: RecoveryReport) -> Self {
        let target = report.target.clone();
        Self::new(target, tokio::spawn(async move { report }))
    }

    /// 目标名称
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 等待恢复命令结束，任务被取消时返回 `None`
    pub async fn wait(self) -> Option<RecoveryReport> {
        self.task.await.ok()
    }
}

/// 恢复触发器trait
#[async_trait]
pub trait RecoveryTrigger: Send + Sync {
    /// 为目标启动恢复命令
    ///
    /// # 参数
    /// * `target` - 不健康的目标
    ///
    /// # 返回
    /// * `Result<RecoveryHandle, RecoveryError>` - 子进程启动后立即返回
    async fn recover(&self, target: &TargetConfig) -> Result<RecoveryHandle, RecoveryError>;
}

/// 通过系统 shell 执行恢复命令的触发器
#[derive(Debug, Clone, Default)]
pub struct CommandRecoveryTrigger;

impl CommandRecoveryTrigger {
    /// 创建新的触发器
    pub fn new() -> Self {
        Self
    }

    /// 构建 shell 命令
    fn shell_command(command_line: &str) -> Command {
        #[cfg(windows)]
        let mut command = {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(command_line);
            command
        };

        #[cfg(not(windows))]
        let mut command = {
            let mut command = Command::new("sh");
            command.arg("-c").arg(command_line);
            command
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

#[async_trait]
impl RecoveryTrigger for CommandRecoveryTrigger {
    async fn recover(&self, target: &TargetConfig) -> Result<RecoveryHandle, RecoveryError> {
        let command_line = target.recovery_command_line();
        debug!("执行恢复命令: {}", command_line);

        let child = Self::shell_command(&command_line)
            .spawn()
            .map_err(|e| RecoveryError::Spawn {
                target: target.name.clone(),
                message: e.to_string(),
            })?;

        let target_name = target.name.clone();
        let task = tokio::spawn(async move {
            match child.wait_with_output().await {
                Ok(output) => {
                    let report = RecoveryReport {
                        target: target_name,
                        command_line,
                        success: output.status.success(),
                        exit_code: output.status.code(),
                        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    };

                    if report.success {
                        info!("已重启 {}:\n{}", report.target, report.stdout.trim_end());
                    } else {
                        error!(
                            "重启 {} 失败 (退出码: {:?}): {}",
                            report.target,
                            report.exit_code,
                            report.stderr.trim_end()
                        );
                    }
                    report
                }
                Err(e) => {
                    error!("等待恢复命令结束失败 {}: {}", target_name, e);
                    RecoveryReport {
                        target: target_name,
                        command_line,
                        success: false,
                        exit_code: None,
                        stdout: String::new(),
                        stderr: e.to_string(),
                    }
                }
            }
        });

        Ok(RecoveryHandle::new(target.name.clone(), task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_receives_target_name() {
        let trigger = CommandRecoveryTrigger::new();
        let target = TargetConfig::new("blog", "https://blog.example.com", "echo restarting");

        let handle = trigger.recover(&target).await.unwrap();
        assert_eq!(handle.target(), "blog");

        let report = handle.wait().await.unwrap();
        assert!(report.success);
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.command_line, "echo restarting blog");
        assert_eq!(report.stdout.trim(), "restarting blog");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_reported() {
        let trigger = CommandRecoveryTrigger::new();
        let target = TargetConfig::new("shop", "https://shop.example.com", "echo oops >&2; exit 3; true");

        let report = trigger.recover(&target).await.unwrap().wait().await.unwrap();
        assert!(!report.success);
        assert_eq!(report.exit_code, Some(3));
        assert_eq!(report.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_completed_handle() {
        let report = RecoveryReport {
            target: "api".to_string(),
            command_line: "restart api".to_string(),
            success: true,
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };

        let handle = RecoveryHandle::completed(report.clone());
        assert_eq!(handle.target(), "api");
        assert_eq!(handle.wait().await, Some(report));
    }
}
