//! 服务管理模块
//!
//! 负责组装检测组件并运行守护循环

use crate::config::{Config, ConfigLoader, FileConfigLoader, GlobalConfig};
use crate::error::Result;
use crate::health::{CheckScheduler, HealthEvaluator};
use crate::probe::HttpProbeClient;
use crate::recovery::{CommandRecoveryTrigger, RecoveryTrigger};
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

/// 服务组件结构
pub struct ServiceComponents {
    /// 不可变配置
    pub config: Arc<Config>,
    /// 检测调度器
    pub scheduler: Arc<CheckScheduler>,
}

/// 服务启动器
pub struct ServiceLauncher;

impl ServiceLauncher {
    /// 加载配置，失败时以空目标列表继续
    pub async fn load_config<P: AsRef<Path> + Send>(config_path: P) -> Arc<Config> {
        let loader = FileConfigLoader::default();
        Arc::new(loader.load_or_idle(config_path).await)
    }

    /// 读取配置文件中的全局配置
    ///
    /// 在日志系统初始化之前调用以获取日志设置，失败时静默返回 `None`
    pub async fn peek_global_config<P: AsRef<Path> + Send>(config_path: P) -> Option<GlobalConfig> {
        FileConfigLoader::default()
            .load_from_file(config_path)
            .await
            .ok()
            .map(|config| config.global)
    }

    /// 初始化服务组件
    ///
    /// # 参数
    /// * `config` - 启动时加载的配置
    pub fn initialize_service_components(config: Arc<Config>) -> Result<ServiceComponents> {
        Self::initialize_with_trigger(config, Arc::new(CommandRecoveryTrigger::new()))
    }

    /// 使用指定的恢复触发器初始化服务组件
    pub fn initialize_with_trigger(
        config: Arc<Config>,
        trigger: Arc<dyn RecoveryTrigger>,
    ) -> Result<ServiceComponents> {
        info!("初始化服务组件...");

        let probe = HttpProbeClient::new(
            config.global.request_timeout(),
            config.global.user_agent.as_deref(),
        )?;
        let evaluator = HealthEvaluator::new(Arc::new(probe));
        let scheduler = Arc::new(CheckScheduler::new(Arc::clone(&config), evaluator, trigger));

        Ok(ServiceComponents { config, scheduler })
    }

    /// 运行守护循环，直到收到 Ctrl+C
    pub async fn run_until_shutdown(components: &ServiceComponents) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let shutdown_tx_clone = shutdown_tx.clone();
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("收到中断信号，正在停止服务...");
                    let _ = shutdown_tx_clone.send(());
                }
                Err(err) => {
                    error!("监听中断信号失败: {}", err);
                }
            }
        });

        if components.config.servers.is_empty() {
            info!("没有配置任何监控目标，调度器将空转");
        }

        components.scheduler.run(shutdown_rx).await;

        info!("服务已停止");
        Ok(())
    }
}
