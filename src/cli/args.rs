//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Service Reviver - 定时健康检测与自动恢复工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "service-reviver",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（.json 或 .toml）",
        env = "SERVICE_REVIVER_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别，不指定时使用配置文件中的 log_level
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "SERVICE_REVIVER_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 日志格式
    #[arg(long, value_enum, default_value = "text", help = "日志格式")]
    pub log_format: LogFormat,

    /// 日志文件路径
    #[arg(long, value_name = "FILE", help = "日志文件路径（不指定则输出到控制台）")]
    pub log_file: Option<PathBuf>,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 日志格式
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

/// 输出格式
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 启动守护进程，按间隔检测并自动恢复
    Start,

    /// 立即执行一轮检测
    Check {
        /// 目标名称（可选，不指定则检测所有目标）
        #[arg(value_name = "TARGET", help = "目标名称")]
        target: Option<String>,

        /// 只检测，不执行恢复命令
        #[arg(long, help = "只检测，不执行恢复命令")]
        no_recover: bool,

        /// 退出前等待恢复命令结束的最长时间（秒）
        #[arg(
            long,
            value_name = "SECONDS",
            default_value = "60",
            help = "退出前等待恢复命令结束的最长时间（秒）"
        )]
        recovery_wait: u64,

        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },

    /// 探测单个URL并输出页面元数据
    Probe {
        /// 目标URL
        #[arg(value_name = "URL", help = "目标URL")]
        url: String,

        /// 超时时间（秒）
        #[arg(
            short,
            long,
            value_name = "SECONDS",
            default_value = "30",
            help = "超时时间（秒）"
        )]
        timeout: u64,

        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },

    /// 验证配置文件
    Validate,

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }
}
