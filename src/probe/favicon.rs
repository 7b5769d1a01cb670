//! 网站图标解析

use reqwest::Url;
use scraper::{Html, Selector};
use tracing::warn;

/// 图标链接选择器，按优先级排列
pub const FAVICON_SELECTORS: &[&str] = &[
    r#"link[rel="apple-touch-icon"]"#,
    r#"link[rel="apple-touch-icon-precomposed"]"#,
    r#"link[rel="icon"]"#,
    r#"link[rel="shortcut icon"]"#,
    r#"link[rel="mask-icon"]"#,
    r#"link[rel="favicon"]"#,
];

/// 没有图标链接时使用的默认路径
pub const DEFAULT_FAVICON_PATH: &str = "/favicon.ico";

/// 把 href 解析为绝对地址
///
/// 绝对地址保持不变，`//host/path` 沿用页面的协议，相对路径基于页面URL拼接
pub fn normalize_href(href: &str, base: &Url) -> Result<String, String> {
    base.join(href.trim())
        .map(String::from)
        .map_err(|e| e.to_string())
}

/// 按优先级解析图标URL
///
/// 取第一个带非空 `href` 的候选；解析失败的候选会被跳过。
/// 全部落空时回退到 `/favicon.ico`，仍失败则返回空字符串。
pub fn resolve_favicon(document: &Html, selectors: &[Selector], base: &Url) -> String {
    for selector in selectors {
        let Some(href) = document
            .select(selector)
            .next()
            .and_then(|link| link.value().attr("href"))
            .filter(|href| !href.trim().is_empty())
        else {
            continue;
        };

        match normalize_href(href, base) {
            Ok(url) => return url,
            Err(e) => {
                warn!("处理图标路径失败: {} - {}", href, e);
                continue;
            }
        }
    }

    normalize_href(DEFAULT_FAVICON_PATH, base).unwrap_or_default()
}
