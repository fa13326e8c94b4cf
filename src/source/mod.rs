// source/mod.rs — 壁纸源抽象接口模块
// 定义所有壁纸源（Bing、Reddit、Pexels）必须实现的通用 Trait

pub mod bing;
pub mod pexels;
pub mod reddit;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 统一的候选壁纸结构
/// 不论来自哪个壁纸源，都转换成这个结构体交给 selector 挑选
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// 标题，可能带有分辨率标注（如 "Fjord [3840x2160]"）
    pub title: String,
    /// 热度（如 Reddit 的得分），没有得分时为 None
    pub popularity: Option<f64>,
    /// 图片的直接下载地址
    pub url: String,
}

impl Candidate {
    /// 标题和地址都不为空才有资格被挑选
    fn is_usable(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// 可选的壁纸源
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Bing 每日一图
    #[default]
    Bing,
    /// Reddit 社区当日热门
    Reddit,
    /// Pexels 关键词搜索（需要 API Key）
    Pexels,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Bing => "bing",
            SourceKind::Reddit => "reddit",
            SourceKind::Pexels => "pexels",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 壁纸源的抽象 Trait
///
/// 每个实现只发出一次请求，并按壁纸源自己的排序返回候选列表。
#[async_trait]
pub trait WallpaperSource {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<Candidate>>;
}

/// 构建所有请求共用的 HTTP 客户端
///
/// 必须带超时：上游无响应时不能让整个程序无限期挂起
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .map_err(|e| Error::Config(format!("cannot build http client: {e}")))
}

/// 根据配置创建对应的壁纸源客户端
pub fn build(
    kind: SourceKind,
    config: &AppConfig,
    client: reqwest::Client,
) -> Result<Box<dyn WallpaperSource>> {
    let source: Box<dyn WallpaperSource> = match kind {
        SourceKind::Bing => Box::new(bing::BingClient::new(client, &config.bing.market)),
        SourceKind::Reddit => Box::new(reddit::RedditClient::new(
            client,
            &config.reddit.subreddit,
            config.reddit.limit,
        )),
        SourceKind::Pexels => {
            let api_key = config
                .pexels_api_key
                .clone()
                .ok_or_else(|| Error::Config("pexels api key is not set".to_string()))?;
            Box::new(pexels::PexelsClient::new(
                client,
                api_key,
                &config.pexels.query,
                config.pexels.per_page,
            ))
        }
    };
    Ok(source)
}

/// 发送请求并读取响应体，网络错误和非 2xx 状态码都视为壁纸源不可用
async fn send_text(source_name: &'static str, request: reqwest::RequestBuilder) -> Result<String> {
    let response = request
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::unavailable(source_name, e))?;

    response
        .text()
        .await
        .map_err(|e| Error::unavailable(source_name, e))
}

/// 按类型化的结构反序列化响应体，结构不符时返回 ParseFailure
fn decode<T: DeserializeOwned>(source_name: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::parse(source_name, e))
}

/// 丢弃标题或地址为空的条目
fn usable(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| {
            let keep = c.is_usable();
            if !keep {
                log::debug!("skipping candidate without title or url: {c:?}");
            }
            keep
        })
        .collect()
}
