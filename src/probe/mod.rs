//! 探测模块
//!
//! 抓取目标页面并提取元数据，作为服务存活的证据

pub mod client;
pub mod favicon;
pub mod metadata;

// 重新导出主要类型
pub use client::{HttpProbeClient, Probe};
pub use metadata::{MetadataExtractor, PageMetadata};
