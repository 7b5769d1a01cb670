//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Service Reviver 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum ReviverError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测相关错误
    #[error("探测错误: {0}")]
    Probe(#[from] ProbeError),

    /// 恢复命令相关错误
    #[error("恢复错误: {0}")]
    Recovery(#[from] RecoveryError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 一次性检测发现不健康的目标
    #[error("{0} 个目标不健康")]
    UnhealthyTargets(usize),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 读取配置文件失败
    #[error("读取配置文件失败: {path}: {message}")]
    Read { path: String, message: String },

    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 探测错误类型
///
/// 网络错误、超时、响应体解码失败和元数据提取失败都归并为
/// `FetchMetadata`，只保留底层原因的描述。
#[derive(Error, Debug)]
pub enum ProbeError {
    /// 获取页面元数据失败
    #[error("获取页面元数据失败: {0}")]
    FetchMetadata(String),

    /// HTTP客户端构建失败
    #[error("HTTP客户端创建失败: {0}")]
    Client(String),
}

/// 恢复命令错误类型
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// 子进程启动失败
    #[error("启动恢复命令失败 [{target}]: {message}")]
    Spawn { target: String, message: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ReviverError>;
