// reddit.rs — Reddit 社区热门帖子客户端
// 返回当日得分最高的若干帖子，由 selector 在其中挑选

use super::{Candidate, WallpaperSource, decode, send_text, usable};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

const NAME: &str = "reddit";

/// top.json 的响应：Listing -> children -> Post
#[derive(Deserialize, Debug)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Deserialize, Debug)]
pub struct ListingData {
    pub children: Vec<Child>,
}

#[derive(Deserialize, Debug)]
pub struct Child {
    pub data: Post,
}

#[derive(Deserialize, Debug)]
pub struct Post {
    pub title: String,
    pub score: i64,
    /// 帖子指向的链接，图片帖即为图片直链
    pub url: String,
}

pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
    subreddit: String,
    limit: u32,
}

impl RedditClient {
    pub fn new(client: reqwest::Client, subreddit: &str, limit: u32) -> Self {
        Self {
            client,
            base_url: String::from("https://www.reddit.com"),
            subreddit: subreddit.to_string(),
            limit,
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
impl WallpaperSource for RedditClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self) -> Result<Vec<Candidate>> {
        let url = format!("{}/r/{}/top.json", self.base_url, self.subreddit);
        let limit = self.limit.to_string();
        let request = self.client.get(&url).query(&[
            ("sort", "top"),
            ("t", "day"),
            ("limit", limit.as_str()),
        ]);

        let body = send_text(NAME, request).await?;
        parse_listing(&body)
    }
}

/// 将 Listing 转换为候选列表，保持 Reddit 给出的排序
pub fn parse_listing(body: &str) -> Result<Vec<Candidate>> {
    let listing: Listing = decode(NAME, body)?;
    let candidates = listing
        .data
        .children
        .into_iter()
        .map(|child| Candidate {
            title: child.data.title,
            // 被踩成负分的帖子按 0 处理
            popularity: Some(child.data.score.max(0) as f64),
            url: child.data.url,
        })
        .collect();

    Ok(usable(candidates))
}
