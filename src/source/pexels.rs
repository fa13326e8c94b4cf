// pexels.rs — Pexels 关键词搜索客户端
//
// API Key 通过 `Authorization: <key>` header 传递（不带 Bearer 前缀）。
// 搜索结果没有热度信息，按相关度排序后全部视为同等热门，
// 并把图片尺寸写进标题，让 selector 按分辨率挑选。

use super::{Candidate, WallpaperSource, decode, send_text, usable};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

const NAME: &str = "pexels";

/// GET /v1/search 的响应
#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    pub photos: Vec<Photo>,
}

#[derive(Deserialize, Debug)]
pub struct Photo {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// 图片描述，可能为空字符串
    #[serde(default)]
    pub alt: Option<String>,
    pub src: PhotoSources,
}

/// 各尺寸图片地址
#[derive(Deserialize, Debug)]
pub struct PhotoSources {
    /// 原图
    pub original: String,
}

pub struct PexelsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    query: String,
    per_page: u32,
}

impl PexelsClient {
    pub fn new(client: reqwest::Client, api_key: String, query: &str, per_page: u32) -> Self {
        Self {
            client,
            base_url: String::from("https://api.pexels.com/v1"),
            api_key,
            query: query.to_string(),
            per_page,
        }
    }

    /// 指向其它服务器（测试用）
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WallpaperSource for PexelsClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self) -> Result<Vec<Candidate>> {
        let url = format!("{}/search", self.base_url);
        let per_page = self.per_page.to_string();
        let request = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", self.query.as_str()),
                ("orientation", "landscape"),
                ("size", "large"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
            ]);

        let body = send_text(NAME, request).await?;
        parse_search(&body)
    }
}

/// 将搜索结果转换为候选列表
pub fn parse_search(body: &str) -> Result<Vec<Candidate>> {
    let response: SearchResponse = decode(NAME, body)?;
    let candidates = response
        .photos
        .into_iter()
        .map(|photo| {
            let label = photo
                .alt
                .filter(|alt| !alt.trim().is_empty())
                .unwrap_or_else(|| format!("pexels-{}", photo.id));
            Candidate {
                title: format!("{} [{}x{}]", label.trim(), photo.width, photo.height),
                popularity: Some(1.0),
                url: photo.src.original,
            }
        })
        .collect();

    Ok(usable(candidates))
}
