//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{ConfigLoader, FileConfigLoader};
use crate::error::{ConfigError, Result, ReviverError};
use crate::health::{PassOptions, PassSummary};
use crate::probe::{HttpProbeClient, PageMetadata, Probe};
use crate::service::ServiceLauncher;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 按子命令分发
pub async fn execute_command(args: &Args) -> Result<()> {
    match &args.command {
        Commands::Start => StartCommand.execute(args).await,
        Commands::Check { .. } => CheckCommand.execute(args).await,
        Commands::Probe { .. } => ProbeCommand.execute(args).await,
        Commands::Validate => ValidateCommand.execute(args).await,
        Commands::Version { .. } => VersionCommand.execute(args).await,
    }
}

/// 启动命令
pub struct StartCommand;

#[async_trait]
impl Command for StartCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let config = ServiceLauncher::load_config(args.get_config_path()).await;
        let components = ServiceLauncher::initialize_service_components(config)?;
        ServiceLauncher::run_until_shutdown(&components).await
    }
}

/// 一次性检测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::Check {
            target,
            no_recover,
            recovery_wait,
            format,
        } = &args.command
        else {
            return Ok(());
        };

        let config = FileConfigLoader::default()
            .load_from_file(args.get_config_path())
            .await?;
        if let Some(name) = target {
            if config.find_target(name).is_none() {
                return Err(ConfigError::ValidationError(format!("未找到目标: {name}")).into());
            }
        }

        let components = ServiceLauncher::initialize_service_components(Arc::new(config))?;
        // 进程退出会连同输出管道一起结束恢复命令，因此先等待其完成
        let options = PassOptions {
            only_target: target.clone(),
            recover: !no_recover,
            wait_for_recovery: Some(Duration::from_secs(*recovery_wait)),
        };
        let summary = components.scheduler.run_pass_with(&options).await;

        print_summary(&summary, *format)?;

        if summary.all_healthy() {
            Ok(())
        } else {
            Err(ReviverError::UnhealthyTargets(summary.unhealthy()))
        }
    }
}

fn print_summary(summary: &PassSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Text => {
            for report in &summary.reports {
                match report.outcome.reason() {
                    None => println!("✓ {:<20} {} ({}ms)", report.target, report.url, report.elapsed_ms()),
                    Some(reason) => println!("✗ {:<20} {} - {}", report.target, report.url, reason),
                }
            }
            for recovery in &summary.recovery_reports {
                let status = if recovery.success { "成功" } else { "失败" };
                println!("↻ {:<20} {} ({})", recovery.target, recovery.command_line, status);
            }
            println!(
                "共 {} 个目标: 正常 {}, 异常 {}, 已触发恢复 {}",
                summary.total(),
                summary.healthy(),
                summary.unhealthy(),
                summary.recoveries_triggered
            );
        }
    }
    Ok(())
}

/// 单URL探测命令
pub struct ProbeCommand;

#[async_trait]
impl Command for ProbeCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::Probe {
            url,
            timeout,
            format,
        } = &args.command
        else {
            return Ok(());
        };

        let client = HttpProbeClient::new(Duration::from_secs(*timeout), None)?;
        let metadata = client.probe(url).await?;
        print_metadata(&metadata, *format)
    }
}

fn print_metadata(metadata: &PageMetadata, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(metadata)?),
        OutputFormat::Text => {
            println!("title:       {}", metadata.title);
            println!("image:       {}", metadata.image_url);
            println!("description: {}", metadata.description);
            println!("date:        {}", metadata.date);
            println!("favicon:     {}", metadata.favicon_url);
        }
    }
    Ok(())
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let config_path = args.get_config_path();
        let config = FileConfigLoader::default()
            .load_from_file(&config_path)
            .await?;

        println!("配置文件有效: {}", config_path.display());
        println!(
            "检测间隔: {}秒, 请求超时: {}秒",
            config.global.check_interval_seconds, config.global.request_timeout_seconds
        );
        for target in &config.servers {
            println!("  - {} {} -> {}", target.name, target.url, target.recovery_command_line());
        }
        Ok(())
    }
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}
