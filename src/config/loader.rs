//! 配置加载器实现
//!
//! 提供JSON/TOML配置文件解析、环境变量替换和错误处理功能

use crate::config::types::{validate_config, Config};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// 默认配置文件名（JSON）
pub const DEFAULT_JSON_CONFIG: &str = "server_config.json";

/// 默认配置文件名（TOML）
pub const DEFAULT_TOML_CONFIG: &str = "server_config.toml";

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON格式
    Json,
    /// TOML格式
    Toml,
}

impl ConfigFormat {
    /// 根据文件扩展名推断格式，`.json` 以外一律按TOML处理
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config>;

    /// 从字符串加载配置
    ///
    /// # 参数
    /// * `content` - 配置文件内容
    /// * `format` - 配置格式
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或错误
    async fn load_from_string(&self, content: &str, format: ConfigFormat) -> Result<Config>;

    /// 验证配置
    fn validate(&self, config: &Config) -> Result<()>;
}

/// 文件配置加载器实现
#[derive(Debug, Clone)]
pub struct FileConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl FileConfigLoader {
    /// 创建新的配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用 `${VAR}` 环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 加载配置，失败时记录错误并返回空闲配置
    ///
    /// 空闲配置没有任何监控目标，调度器照常运行但每轮都是空操作。
    /// 不重试，也不会让进程退出。
    pub async fn load_or_idle<P: AsRef<Path> + Send>(&self, path: P) -> Config {
        let path = path.as_ref();
        match self.load_from_file(path).await {
            Ok(config) => config,
            Err(e) => {
                error!("加载配置失败，将以空目标列表运行: {} - {}", path.display(), e);
                Config::idle()
            }
        }
    }

    /// 替换字符串中的环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(ConfigError::EnvVarError {
                        var: var_name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(result)
    }

    /// 按格式解析配置内容
    fn parse(&self, content: &str, format: ConfigFormat) -> Result<Config> {
        let processed_content = self.substitute_env_vars(content)?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&processed_content)
                .map_err(|e| ConfigError::ParseError(format!("JSON解析失败: {e}")))?,
            ConfigFormat::Toml => toml::from_str(&processed_content)
                .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?,
        };

        Ok(config)
    }
}

impl Default for FileConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl ConfigLoader for FileConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read {
                path: path.to_string_lossy().to_string(),
                message: e.to_string(),
            })?;

        let config = self.parse(&content, ConfigFormat::from_path(path))?;
        self.validate(&config)?;

        info!(
            "成功加载配置文件: {}，目标数量: {}",
            path.display(),
            config.servers.len()
        );
        debug!("配置内容: {:?}", config);

        Ok(config)
    }

    async fn load_from_string(&self, content: &str, format: ConfigFormat) -> Result<Config> {
        let config = self.parse(content, format)?;
        self.validate(&config)?;

        debug!("成功解析配置字符串");

        Ok(config)
    }

    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// 获取默认配置文件路径
///
/// 优先使用当前目录下的 `server_config.json`，其次 `server_config.toml`，
/// 都不存在时使用用户配置目录下的 `service-reviver/server_config.toml`
pub fn get_default_config_path() -> PathBuf {
    if Path::new(DEFAULT_JSON_CONFIG).exists() {
        return PathBuf::from(DEFAULT_JSON_CONFIG);
    }
    if Path::new(DEFAULT_TOML_CONFIG).exists() {
        return PathBuf::from(DEFAULT_TOML_CONFIG);
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join("service-reviver").join(DEFAULT_TOML_CONFIG))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOML_CONFIG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_CONFIG_JSON: &str = r#"
{
  "servers": [
    { "name": "blog", "url": "https://blog.example.com", "command": "pm2 restart" },
    { "name": "shop", "url": "http://127.0.0.1:3000", "command": "docker restart" }
  ]
}
"#;

    const TEST_CONFIG_TOML: &str = r#"
[global]
check_interval_seconds = 60
request_timeout_seconds = 5
check_on_start = true

[[servers]]
name = "blog"
url = "https://blog.example.com"
recovery_command = "pm2 restart"
"#;

    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/server_config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a/server_config.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("server_config.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("server_config")), ConfigFormat::Toml);
    }

    #[tokio::test]
    async fn test_json_parsing_keeps_order_and_defaults() {
        let loader = FileConfigLoader::new(false);
        let config = loader
            .load_from_string(TEST_CONFIG_JSON, ConfigFormat::Json)
            .await
            .unwrap();

        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers[0].name, "blog");
        assert_eq!(config.servers[1].name, "shop");
        assert_eq!(config.servers[1].command, "docker restart");
        assert_eq!(config.global.check_interval_seconds, 300);
    }

    #[tokio::test]
    async fn test_toml_parsing_with_alias() {
        let loader = FileConfigLoader::new(false);
        let config = loader
            .load_from_string(TEST_CONFIG_TOML, ConfigFormat::Toml)
            .await
            .unwrap();

        assert_eq!(config.global.check_interval_seconds, 60);
        assert_eq!(config.global.request_timeout_seconds, 5);
        assert!(config.global.check_on_start);
        assert_eq!(config.servers[0].command, "pm2 restart");
    }

    #[tokio::test]
    async fn test_load_from_file_by_extension() {
        let file = write_temp(".json", TEST_CONFIG_JSON);
        let loader = FileConfigLoader::new(false);
        let config = loader.load_from_file(file.path()).await.unwrap();
        assert_eq!(config.servers.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let loader = FileConfigLoader::new(false);
        let result = loader.load_from_file("/nonexistent/server_config.json").await;
        assert!(matches!(
            result,
            Err(crate::error::ReviverError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_load_or_idle_on_malformed_file() {
        let file = write_temp(".json", "{ \"servers\": [ { \"name\": ");
        let loader = FileConfigLoader::new(false);
        let config = loader.load_or_idle(file.path()).await;
        assert!(config.servers.is_empty());
        assert_eq!(config, Config::idle());
    }

    #[tokio::test]
    async fn test_load_or_idle_on_missing_file() {
        let loader = FileConfigLoader::default();
        let config = loader.load_or_idle("/nonexistent/server_config.toml").await;
        assert!(config.servers.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_target_is_rejected() {
        let content = r#"{"servers": [{"name": "blog", "url": "blog.example.com", "command": "x"}]}"#;
        let loader = FileConfigLoader::new(false);
        let result = loader.load_from_string(content, ConfigFormat::Json).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution() {
        env::set_var("REVIVER_TEST_HOST", "status.example.com");

        let content = r#"
[[servers]]
name = "status"
url = "https://${REVIVER_TEST_HOST}/"
command = "restart.sh"
"#;
        let loader = FileConfigLoader::new(true);
        let config = loader
            .load_from_string(content, ConfigFormat::Toml)
            .await
            .unwrap();
        assert_eq!(config.servers[0].url, "https://status.example.com/");

        env::remove_var("REVIVER_TEST_HOST");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution_missing_var() {
        let content = r#"{"servers": [{"name": "a", "url": "${REVIVER_MISSING_VAR}", "command": "x"}]}"#;
        let loader = FileConfigLoader::new(true);
        let result = loader.load_from_string(content, ConfigFormat::Json).await;

        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("REVIVER_MISSING_VAR"));
        }
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = FileConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        assert!(path.to_string_lossy().contains("server_config"));
    }
}
