//! 配置数据结构定义
//!
//! 定义监控目标、全局配置以及验证逻辑

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 主配置结构，包含全局配置和监控目标列表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 监控目标列表（按文件中的顺序检测）
    #[serde(default)]
    pub servers: Vec<TargetConfig>,
}

impl Config {
    /// 空闲配置：默认全局配置且没有任何监控目标
    ///
    /// 配置加载失败时使用，调度器每轮都不做任何事
    pub fn idle() -> Self {
        Self {
            global: GlobalConfig::default(),
            servers: Vec::new(),
        }
    }

    /// 按名称查找监控目标
    pub fn find_target(&self, name: &str) -> Option<&TargetConfig> {
        self.servers.iter().find(|target| target.name == name)
    }
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 检测间隔（秒），默认5分钟
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// 单次探测的请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// 启动后是否立即执行一轮检测
    #[serde(default)]
    pub check_on_start: bool,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 模块级别日志，如 `{"html5ever" = "warn"}`
    #[serde(default)]
    pub module_log_levels: HashMap<String, String>,
    /// 自定义 User-Agent
    pub user_agent: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval(),
            request_timeout_seconds: default_timeout(),
            check_on_start: false,
            log_level: default_log_level(),
            module_log_levels: HashMap::new(),
            user_agent: None,
        }
    }
}

impl GlobalConfig {
    /// 检测间隔
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    /// 探测超时时间
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// 监控目标配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetConfig {
    /// 目标名称，同时作为恢复命令的最后一个参数
    pub name: String,
    /// 探测URL
    pub url: String,
    /// 恢复命令
    #[serde(alias = "recovery_command")]
    pub command: String,
}

impl TargetConfig {
    /// 创建新的监控目标
    pub fn new(name: impl Into<String>, url: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            command: command.into(),
        }
    }

    /// 完整的恢复命令行：`{command} {name}`
    pub fn recovery_command_line(&self) -> String {
        format!("{} {}", self.command, self.name)
    }
}

// 默认值函数
fn default_check_interval() -> u64 {
    300
}
fn default_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.global.check_interval_seconds == 0 {
        return Err("检测间隔不能为0".to_string());
    }

    if config.global.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    for (module, level) in &config.global.module_log_levels {
        if module.trim().is_empty() {
            return Err("模块日志级别的模块名不能为空".to_string());
        }
        if !valid_log_levels.contains(&level.as_str()) {
            return Err(format!("模块 {module} 的日志级别无效: {level}"));
        }
    }

    // 目标列表允许为空，此时守护进程空转
    for target in &config.servers {
        if target.name.trim().is_empty() {
            return Err("目标名称不能为空".to_string());
        }

        if !target.url.starts_with("http://") && !target.url.starts_with("https://") {
            return Err(format!("目标 {} 的URL格式无效: {}", target.name, target.url));
        }

        if target.command.trim().is_empty() {
            return Err(format!("目标 {} 的恢复命令不能为空", target.name));
        }
    }

    Ok(())
}
