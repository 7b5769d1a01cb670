//! HTTP探测客户端实现
//!
//! 对目标URL发起GET请求，把响应体当作HTML解析并提取元数据。
//! 任何失败都归并为 [`ProbeError::FetchMetadata`]。

use crate::error::ProbeError;
use crate::probe::metadata::{MetadataExtractor, PageMetadata};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// 探测接口
#[async_trait]
pub trait Probe: Send + Sync {
    /// 探测URL并返回页面元数据
    ///
    /// # 参数
    /// * `url` - 目标URL
    ///
    /// # 返回
    /// * `Result<PageMetadata, ProbeError>` - 元数据，或失败原因
    async fn probe(&self, url: &str) -> Result<PageMetadata, ProbeError>;
}

/// 基于 reqwest 的HTTP探测客户端
#[derive(Debug, Clone)]
pub struct HttpProbeClient {
    /// HTTP客户端
    client: Client,
    /// 单次探测的超时时间
    timeout: Duration,
    /// 元数据提取器
    extractor: Arc<MetadataExtractor>,
}

impl HttpProbeClient {
    /// 创建新的探测客户端
    ///
    /// # 参数
    /// * `timeout` - 单次探测（请求加读取响应体）的超时时间
    /// * `user_agent` - 自定义 User-Agent，`None` 时使用 `service-reviver/<版本>`
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, ProbeError> {
        let user_agent = user_agent
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/{}", crate::APP_NAME, crate::VERSION));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            extractor: Arc::new(MetadataExtractor::new()?),
        })
    }

    /// 获取超时时间
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 发起请求并读取响应体
    ///
    /// 返回重定向之后的最终URL和响应体文本。HTTP错误状态码不视为失败。
    async fn fetch(&self, url: &str) -> Result<(Url, String), ProbeError> {
        let url = Url::parse(url).map_err(|e| ProbeError::FetchMetadata(format!("无效的URL {url}: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::FetchMetadata(format_request_error(&e)))?;

        let status = response.status();
        let final_url = response.url().clone();
        debug!("探测响应: {} -> {}", final_url, status);

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::FetchMetadata(format_request_error(&e)))?;

        Ok((final_url, body))
    }
}

#[async_trait]
impl Probe for HttpProbeClient {
    async fn probe(&self, url: &str) -> Result<PageMetadata, ProbeError> {
        let (page_url, body) = match timeout(self.timeout, self.fetch(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProbeError::FetchMetadata(format!(
                    "Request timeout after {}ms",
                    self.timeout.as_millis()
                )))
            }
        };

        Ok(self.extractor.extract(&body, &page_url))
    }
}

/// 格式化请求错误信息，保留底层原因
fn format_request_error(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "Request timeout"
    } else if error.is_connect() {
        "Connection failed"
    } else if error.is_redirect() {
        "Redirect error"
    } else if error.is_body() || error.is_decode() {
        "Response decode error"
    } else if error.is_request() {
        "Invalid request"
    } else {
        "Request failed"
    };

    format!("{kind}: {error}")
}
