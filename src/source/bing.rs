// bing.rs — Bing 每日一图客户端
// 每次只返回一个候选，挑选步骤自然退化为"直接用它"

use super::{Candidate, WallpaperSource, decode, send_text, usable};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;

const NAME: &str = "bing";

/// HPImageArchive 接口的响应
#[derive(Deserialize, Debug)]
pub struct ArchiveResponse {
    pub images: Vec<ArchiveImage>,
}

#[derive(Deserialize, Debug)]
pub struct ArchiveImage {
    /// 相对地址，如 "/th?id=OHR.MistyFjord_EN-US1234_1920x1080.jpg&rf=..."
    pub url: String,
    /// 不带尺寸后缀的地址，如 "/th?id=OHR.MistyFjord_EN-US1234"
    pub urlbase: String,
    /// 发布日期，如 "20261018"
    pub startdate: String,
    #[serde(default)]
    pub copyright: Option<String>,
}

pub struct BingClient {
    client: reqwest::Client,
    base_url: String,
    market: String,
}

impl BingClient {
    pub fn new(client: reqwest::Client, market: &str) -> Self {
        Self {
            client,
            base_url: String::from("https://www.bing.com"),
            market: market.to_string(),
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
impl WallpaperSource for BingClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self) -> Result<Vec<Candidate>> {
        let url = format!("{}/HPImageArchive.aspx", self.base_url);
        let request = self.client.get(&url).query(&[
            ("format", "js"),
            ("idx", "0"),
            ("n", "1"),
            ("mkt", self.market.as_str()),
        ]);

        let body = send_text(NAME, request).await?;
        parse_archive(&self.base_url, &body)
    }
}

/// 将 HPImageArchive 的响应转换为候选列表
pub fn parse_archive(base_url: &str, body: &str) -> Result<Vec<Candidate>> {
    let response: ArchiveResponse = decode(NAME, body)?;
    let image = response
        .images
        .into_iter()
        .next()
        .ok_or_else(|| Error::parse(NAME, "response contains no images"))?;

    if let Some(copyright) = &image.copyright {
        log::debug!("bing image of the day: {copyright}");
    }

    // 默认给出的是 1920x1080，换成 UHD 获取最高分辨率
    let url = format!("{}{}", base_url, image.url.replace("1920x1080", "UHD"));
    let title = image_name(&image.urlbase)
        .map(str::to_string)
        .unwrap_or(image.startdate);

    Ok(usable(vec![Candidate {
        title,
        popularity: Some(1.0),
        url,
    }]))
}

/// 从 urlbase 中取出图片标识，即最后一个 '.' 和最后一个 '_' 之间的部分
fn image_name(urlbase: &str) -> Option<&str> {
    let start = urlbase.rfind('.')? + 1;
    let end = urlbase.rfind('_')?;
    urlbase.get(start..end).filter(|name| !name.is_empty())
}
