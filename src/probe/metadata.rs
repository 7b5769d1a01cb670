//! 页面元数据提取
//!
//! 每个字段对应一张按优先级排列的 `(选择器, 取值方式)` 候选表，
//! 取第一个非空的值。

use crate::error::ProbeError;
use crate::probe::favicon::{resolve_favicon, FAVICON_SELECTORS};
use reqwest::Url;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// 探测得到的页面元数据
///
/// 所有字段缺失时为空字符串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// 页面标题
    pub title: String,
    /// 预览图片URL
    pub image_url: String,
    /// 页面描述
    pub description: String,
    /// 发布/修改时间
    pub date: String,
    /// 网站图标URL
    pub favicon_url: String,
}

impl PageMetadata {
    /// 是否所有字段都为空
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.image_url.is_empty()
            && self.description.is_empty()
            && self.date.is_empty()
            && self.favicon_url.is_empty()
    }
}

/// 候选值的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// 元素属性
    Attr(&'static str),
    /// 元素文本内容
    Text,
}

type CandidateTable = &'static [(&'static str, ValueSource)];

const TITLE_CANDIDATES: CandidateTable = &[
    (r#"meta[property="og:title"]"#, ValueSource::Attr("content")),
    ("title", ValueSource::Text),
];

const IMAGE_CANDIDATES: CandidateTable = &[
    (r#"meta[property="og:image"]"#, ValueSource::Attr("content")),
    (r#"meta[name="twitter:image"]"#, ValueSource::Attr("content")),
];

const DESCRIPTION_CANDIDATES: CandidateTable = &[
    (r#"meta[property="og:description"]"#, ValueSource::Attr("content")),
    (r#"meta[name="description"]"#, ValueSource::Attr("content")),
];

const DATE_CANDIDATES: CandidateTable = &[
    (r#"meta[property="article:published_time"]"#, ValueSource::Attr("content")),
    (r#"meta[property="article:modified_time"]"#, ValueSource::Attr("content")),
    ("time", ValueSource::Attr("datetime")),
];

/// 编译后的候选项
#[derive(Debug)]
struct Candidate {
    selector: Selector,
    source: ValueSource,
}

/// 元数据提取器
///
/// 选择器在构造时编译一次，之后可在多个探测之间共享
#[derive(Debug)]
pub struct MetadataExtractor {
    title: Vec<Candidate>,
    image: Vec<Candidate>,
    description: Vec<Candidate>,
    date: Vec<Candidate>,
    favicon: Vec<Selector>,
}

impl MetadataExtractor {
    /// 编译全部候选选择器
    pub fn new() -> Result<Self, ProbeError> {
        Ok(Self {
            title: compile_table(TITLE_CANDIDATES)?,
            image: compile_table(IMAGE_CANDIDATES)?,
            description: compile_table(DESCRIPTION_CANDIDATES)?,
            date: compile_table(DATE_CANDIDATES)?,
            favicon: FAVICON_SELECTORS
                .iter()
                .map(|selector| compile_selector(selector))
                .collect::<Result<_, _>>()?,
        })
    }

    /// 从HTML文本提取元数据
    ///
    /// # 参数
    /// * `html` - 响应体
    /// * `page_url` - 页面URL，用于解析相对的图标地址
    pub fn extract(&self, html: &str, page_url: &Url) -> PageMetadata {
        let document = Html::parse_document(html);

        PageMetadata {
            title: first_value(&document, &self.title),
            image_url: first_value(&document, &self.image),
            description: first_value(&document, &self.description),
            date: first_value(&document, &self.date),
            favicon_url: resolve_favicon(&document, &self.favicon, page_url),
        }
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ProbeError> {
    Selector::parse(selector)
        .map_err(|e| ProbeError::FetchMetadata(format!("无效的选择器 {selector}: {e}")))
}

fn compile_table(table: CandidateTable) -> Result<Vec<Candidate>, ProbeError> {
    table
        .iter()
        .map(|(selector, source)| {
            Ok(Candidate {
                selector: compile_selector(selector)?,
                source: *source,
            })
        })
        .collect()
}

/// 依次尝试候选项，返回第一个非空值
///
/// 每个选择器只看文档中第一个匹配的元素
fn first_value(document: &Html, candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .find_map(|candidate| {
            let element = document.select(&candidate.selector).next()?;
            let value = match candidate.source {
                ValueSource::Attr(name) => element.value().attr(name)?.trim().to_string(),
                ValueSource::Text => element.text().collect::<String>().trim().to_string(),
            };
            (!value.is_empty()).then_some(value)
        })
        .unwrap_or_default()
}
