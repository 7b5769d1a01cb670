//! 健康评估器
//!
//! 调用探测客户端，把结果归类为健康或不健康

use crate::config::TargetConfig;
use crate::health::result::{CheckOutcome, CheckReport};
use crate::probe::Probe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// 健康评估器
#[derive(Clone)]
pub struct HealthEvaluator {
    probe: Arc<dyn Probe>,
}

impl HealthEvaluator {
    /// 创建新的评估器
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self { probe }
    }

    /// 评估单个目标
    ///
    /// 探测出错即不健康；探测完成即健康，不看提取到的元数据内容
    pub async fn evaluate(&self, target: &TargetConfig) -> CheckReport {
        let started = Instant::now();
        let result = self.probe.probe(&target.url).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(metadata) => {
                info!("{} 运行正常 ({}ms)", target.name, elapsed.as_millis());
                debug!("{} 页面元数据: {:?}", target.name, metadata);
                CheckOutcome::Healthy
            }
            Err(e) => {
                warn!("{} 已宕机: {}", target.name, e);
                CheckOutcome::Unhealthy {
                    reason: e.to_string(),
                }
            }
        };

        CheckReport::new(target.name.clone(), target.url.clone(), outcome, elapsed)
    }
}
