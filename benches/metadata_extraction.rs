//! 元数据提取基准测试
//!
//! 测试选择器匹配和favicon解析的开销

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use reqwest::Url;
use service_reviver::config::{ConfigFormat, ConfigLoader, FileConfigLoader};
use service_reviver::probe::MetadataExtractor;

const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html><head>
<title>Release notes</title>
<meta property="og:title" content="Release notes for 2.0">
<meta property="og:image" content="https://cdn.example.com/cover.png">
<meta name="description" content="Everything that changed in 2.0">
<meta property="article:published_time" content="2024-05-01T08:00:00Z">
<link rel="shortcut icon" href="//cdn.example.com/favicon.ico">
</head><body><article><p>Body</p></article></body></html>"#;

const BARE_PAGE: &str = "<html><head></head><body>ok</body></html>";

/// 元数据提取基准测试
fn metadata_extraction_benchmark(c: &mut Criterion) {
    let extractor = match MetadataExtractor::new() {
        Ok(extractor) => extractor,
        Err(e) => panic!("构建提取器失败: {e}"),
    };
    let page_url = match Url::parse("https://blog.example.com/posts/2.0") {
        Ok(url) => url,
        Err(e) => panic!("无效的URL: {e}"),
    };

    c.bench_function("extract_article_page", |b| {
        b.iter(|| black_box(extractor.extract(black_box(ARTICLE_PAGE), &page_url)));
    });

    c.bench_function("extract_bare_page", |b| {
        b.iter(|| black_box(extractor.extract(black_box(BARE_PAGE), &page_url)));
    });
}

/// 配置解析基准测试
fn config_parsing_benchmark(c: &mut Criterion) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => panic!("创建运行时失败: {e}"),
    };
    let loader = FileConfigLoader::new(false);
    let content = r#"{
        "servers": [
            {"name": "blog", "url": "https://blog.example.com", "command": "restart"},
            {"name": "shop", "url": "https://shop.example.com", "command": "restart"}
        ]
    }"#;

    c.bench_function("parse_json_config", |b| {
        b.iter(|| {
            let config = runtime.block_on(loader.load_from_string(black_box(content), ConfigFormat::Json));
            black_box(config)
        });
    });
}

criterion_group!(benches, metadata_extraction_benchmark, config_parsing_benchmark);
criterion_main!(benches);
