//! 配置管理模块
//!
//! 提供配置文件解析和验证功能，配置在启动时加载一次，之后不可变

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{get_default_config_path, ConfigFormat, ConfigLoader, FileConfigLoader};
pub use types::{validate_config, Config, GlobalConfig, TargetConfig};
