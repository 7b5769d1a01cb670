//! 检测调度器模块
//!
//! 按固定间隔对所有目标执行一轮检测，并为不健康的目标触发恢复命令

use crate::config::{Config, TargetConfig};
use crate::health::evaluator::HealthEvaluator;
use crate::health::result::PassSummary;
use crate::recovery::{RecoveryHandle, RecoveryTrigger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, timeout_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn, Instrument};

/// 单轮检测选项
#[derive(Debug, Clone)]
pub struct PassOptions {
    /// 只检测指定名称的目标
    pub only_target: Option<String>,
    /// 是否对不健康目标执行恢复命令
    pub recover: bool,
    /// 本轮结束前等待恢复命令完成的最长时间，`None` 表示不等待
    pub wait_for_recovery: Option<Duration>,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            only_target: None,
            recover: true,
            wait_for_recovery: None,
        }
    }
}

/// 检测调度器
///
/// 持有启动时构建的不可变配置。同一时刻最多只有一轮检测在进行，
/// 上一轮未结束时新的一轮会被跳过。
pub struct CheckScheduler {
    /// 配置
    config: Arc<Config>,
    /// 健康评估器
    evaluator: HealthEvaluator,
    /// 恢复触发器
    trigger: Arc<dyn RecoveryTrigger>,
    /// 是否有一轮检测正在进行
    pass_in_progress: AtomicBool,
}

/// 释放进行中标记，检测被取消时同样生效
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CheckScheduler {
    /// 创建新的调度器
    ///
    /// # 参数
    /// * `config` - 启动时加载的配置
    /// * `evaluator` - 健康评估器
    /// * `trigger` - 恢复触发器
    pub fn new(
        config: Arc<Config>,
        evaluator: HealthEvaluator,
        trigger: Arc<dyn RecoveryTrigger>,
    ) -> Self {
        Self {
            config,
            evaluator,
            trigger,
            pass_in_progress: AtomicBool::new(false),
        }
    }

    /// 获取配置
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 执行一轮完整检测
    pub async fn run_pass(&self) -> PassSummary {
        self.run_pass_with(&PassOptions::default()).await
    }

    /// 按选项执行一轮检测
    ///
    /// 目标按配置顺序逐个检测，前一个探测结束后才开始下一个。
    /// 单个目标的失败不会影响其余目标。
    pub async fn run_pass_with(&self, options: &PassOptions) -> PassSummary {
        if self
            .pass_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("上一轮检测尚未结束，跳过本轮");
            return PassSummary::skipped();
        }
        let _guard = PassGuard(&self.pass_in_progress);

        let mut summary = PassSummary::new();
        let span = tracing::info_span!("pass", id = %summary.pass_id);

        async {
            info!("开始检查服务状态...");

            let targets = self
                .config
                .servers
                .iter()
                .filter(|target| {
                    options
                        .only_target
                        .as_deref()
                        .is_none_or(|name| target.name == name)
                });

            let mut handles = Vec::new();
            for target in targets {
                let report = self.evaluator.evaluate(target).await;

                if !report.outcome.is_healthy() {
                    if options.recover {
                        if let Some(handle) = self.trigger_recovery(target, &mut summary).await {
                            handles.push(handle);
                        }
                    } else {
                        debug!("已禁用恢复，跳过: {}", target.name);
                    }
                }

                summary.reports.push(report);
            }

            if let Some(limit) = options.wait_for_recovery {
                Self::collect_recoveries(handles, limit, &mut summary).await;
            }

            info!(
                "本轮检测完成: 共 {} 个目标, 正常 {}, 异常 {}, 已触发恢复 {}",
                summary.total(),
                summary.healthy(),
                summary.unhealthy(),
                summary.recoveries_triggered
            );
        }
        .instrument(span)
        .await;

        summary
    }

    /// 触发恢复命令，不等待其结束
    async fn trigger_recovery(
        &self,
        target: &TargetConfig,
        summary: &mut PassSummary,
    ) -> Option<RecoveryHandle> {
        info!("{} 已宕机，正在重启...", target.name);

        match self.trigger.recover(target).await {
            Ok(handle) => {
                debug!("恢复命令已启动: {}", handle.target());
                summary.recoveries_triggered += 1;
                Some(handle)
            }
            Err(e) => {
                error!("触发恢复失败: {}", e);
                summary.recovery_failures += 1;
                None
            }
        }
    }

    /// 在时限内等待已启动的恢复命令结束，并记录其结果
    async fn collect_recoveries(
        handles: Vec<RecoveryHandle>,
        limit: Duration,
        summary: &mut PassSummary,
    ) {
        let deadline = Instant::now() + limit;

        for handle in handles {
            let target = handle.target().to_string();
            match timeout_at(deadline, handle.wait()).await {
                Ok(Some(report)) => summary.recovery_reports.push(report),
                Ok(None) => warn!("恢复任务被取消: {}", target),
                Err(_) => warn!("等待恢复命令超时 ({}秒): {}", limit.as_secs(), target),
            }
        }
    }

    /// 按固定间隔循环检测，直到收到关闭信号
    ///
    /// 默认在启动一个间隔之后执行第一轮；`check_on_start` 为真时立即执行。
    /// 某一轮耗时超过间隔时，错过的时间点直接跳过。
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        let period = self.config.global.check_interval();
        let start = if self.config.global.check_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };

        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "调度器已启动，目标数量: {}，检测间隔: {}秒",
            self.config.servers.len(),
            period.as_secs()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let started = Instant::now();
                    tokio::select! {
                        _ = self.run_pass() => {}
                        _ = shutdown_rx.recv() => {
                            info!("收到关闭信号，中止当前检测");
                            break;
                        }
                    }

                    let elapsed = started.elapsed();
                    if elapsed > period {
                        warn!(
                            "本轮检测耗时 {}秒，超过检测间隔 {}秒",
                            elapsed.as_secs(),
                            period.as_secs()
                        );
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("收到关闭信号，调度器停止");
                    break;
                }
            }
        }
    }
}
