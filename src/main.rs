//! Service Reviver 主程序入口
//!
//! 定时健康检测与自动恢复工具

use anyhow::{Context, Result};
use clap::Parser;
use service_reviver::cli::{execute_command, Args, LogFormat};
use service_reviver::logging::{self, LogConfig, LoggingSystem};
use service_reviver::service::ServiceLauncher;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 命令行未指定级别时使用配置文件中的 log_level
    let global = ServiceLauncher::peek_global_config(args.get_config_path()).await;
    let level = match args.log_level {
        Some(level) => level.into(),
        None => global
            .as_ref()
            .and_then(|global| logging::parse_level(&global.log_level))
            .unwrap_or(log::LevelFilter::Info),
    };
    let module_levels = global
        .as_ref()
        .map(|global| logging::parse_module_levels(&global.module_log_levels))
        .unwrap_or_default();

    let log_config = LogConfig {
        level,
        file_path: args.log_file.clone(),
        json_format: args.log_format == LogFormat::Json,
        module_levels,
    };

    let logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!(
        "Service Reviver v{} 启动，日志级别: {}",
        service_reviver::VERSION,
        logging_system.config().level
    );

    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
