// config.rs — 配置管理模块
// 遵循 Unix 风格：优先从 ~/.config/wallsets/config.toml 读取配置

use crate::error::{Error, Result};
use crate::setter::WallpaperStyle;
use crate::source::SourceKind;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellexpand::tilde; // 用于展开 ~ 和环境变量
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `config set` 支持的键
pub const SETTABLE_KEYS: &[&str] = &[
    "source", "style", "timeout", "dir", "market", "subreddit", "limit", "query", "per_page",
];

/// 展开路径中的 ~ 和环境变量，相对路径则相对于 home
fn resolve_path(home: &Path, path_str: &str) -> PathBuf {
    let p = PathBuf::from(tilde(path_str).into_owned());
    if p.is_absolute() { p } else { home.join(p) }
}

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct ConfigFile {
    #[serde(default)]
    common: CommonConfig,
    #[serde(default)]
    source: SourceConfigs,
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct CommonConfig {
    /// 壁纸保存目录 (支持 ~、$HOME 等环境变量，相对路径则相对于 $HOME)
    /// 不配置则默认为 <图片文件夹>/Wallpapers
    wallpaper_dir: Option<String>,
    /// 默认壁纸来源 (bing / reddit / pexels)，默认 bing
    #[serde(default)]
    source: SourceKind,
    /// 壁纸显示样式 (current / centered / stretched / tiled)，默认 stretched
    #[serde(default)]
    style: WallpaperStyle,
    /// 每个网络请求的超时时间（秒）
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_market() -> String {
    "en-US".to_string()
}
fn default_subreddit() -> String {
    "wallpaper".to_string()
}
fn default_limit() -> u32 {
    3
}
fn default_query() -> String {
    "nature".to_string()
}
fn default_per_page() -> u32 {
    1
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct SourceConfigs {
    #[serde(default)]
    bing: BingConfig,
    #[serde(default)]
    reddit: RedditConfig,
    #[serde(default)]
    pexels: PexelsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct BingConfig {
    /// 市场代码，决定每日一图的地区版本
    #[serde(default = "default_market")]
    pub market: String,
}

impl Default for BingConfig {
    fn default() -> Self {
        Self {
            market: default_market(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RedditConfig {
    /// 社区名称（不带 r/ 前缀）
    #[serde(default = "default_subreddit")]
    pub subreddit: String,
    /// 参与挑选的热门帖子数量
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            subreddit: default_subreddit(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PexelsConfig {
    /// Pexels API Key（环境变量 PEXELS_API_KEY 优先）
    #[serde(default)]
    pub api_key: Option<String>,
    /// 搜索关键词
    #[serde(default = "default_query")]
    pub query: String,
    /// 参与挑选的搜索结果数量
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for PexelsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            query: default_query(),
            per_page: default_per_page(),
        }
    }
}

/// 应用全局配置项
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Pexels API Key (优先级：ENV > TOML)
    pub pexels_api_key: Option<String>,
    /// 默认壁纸来源
    pub default_source: SourceKind,
    /// 默认显示样式
    pub style: WallpaperStyle,
    /// 网络请求超时时间
    pub timeout: Duration,
    /// 壁纸保存目录
    pub wallpaper_dir: PathBuf,
    /// 配置文件所在路径
    pub config_path: PathBuf,
    /// 用于解析相对路径
    home: PathBuf,
    /// 用户写下的保存目录原文，未设置时不写回文件
    wallpaper_dir_setting: Option<String>,
    pub bing: BingConfig,
    pub reddit: RedditConfig,
    pub pexels: PexelsConfig,
}

impl Default for AppConfig {
    /// 不读取文件和环境变量的默认配置
    fn default() -> Self {
        let home = PathBuf::from(".");
        let pictures = home.join("Pictures");
        Self::from_file(
            ConfigFile::default(),
            home.join("config.toml"),
            home,
            &pictures,
            None,
        )
    }
}

impl AppConfig {
    /// 读取配置文件和环境变量
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))?;
        let config_path = home.join(".config").join("wallsets").join("config.toml");
        let pictures = dirs::picture_dir().unwrap_or_else(|| home.join("Pictures"));

        let config_file = Self::load_config_from_file(&config_path)?;
        let env_key = env::var("PEXELS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self::from_file(
            config_file,
            config_path,
            home,
            &pictures,
            env_key,
        ))
    }

    fn from_file(
        config_file: ConfigFile,
        config_path: PathBuf,
        home: PathBuf,
        pictures: &Path,
        env_key: Option<String>,
    ) -> Self {
        let wallpaper_dir = match &config_file.common.wallpaper_dir {
            Some(dir_str) => resolve_path(&home, dir_str),
            None => pictures.join("Wallpapers"),
        };

        // 优先级：环境变量 > 配置文件内容
        let pexels_api_key = env_key.or_else(|| config_file.source.pexels.api_key.clone());

        Self {
            pexels_api_key,
            default_source: config_file.common.source,
            style: config_file.common.style,
            timeout: Duration::from_secs(config_file.common.timeout_secs.max(1)),
            wallpaper_dir,
            config_path,
            home,
            wallpaper_dir_setting: config_file.common.wallpaper_dir,
            bing: config_file.source.bing,
            reddit: config_file.source.reddit,
            pexels: config_file.source.pexels,
        }
    }

    /// 解析 TOML 配置文件；文件不存在时使用默认值
    fn load_config_from_file(path: &Path) -> Result<ConfigFile> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ConfigFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn parse(content: &str) -> std::result::Result<ConfigFile, toml::de::Error> {
        toml::from_str(content)
    }

    /// 修改单个配置项（不会自动保存）
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |reason: String| Error::Config(format!("invalid value for {key}: {reason}"));
        match key {
            "source" => {
                self.default_source = SourceKind::from_str(value, true).map_err(invalid)?
            }
            "style" => self.style = WallpaperStyle::from_str(value, true).map_err(invalid)?,
            "timeout" => {
                let secs: u64 = value.parse().map_err(|e| invalid(format!("{e}")))?;
                self.timeout = Duration::from_secs(secs.max(1));
            }
            "dir" => {
                self.wallpaper_dir = resolve_path(&self.home, value);
                self.wallpaper_dir_setting = Some(value.to_string());
            }
            "market" => self.bing.market = value.to_string(),
            "subreddit" => self.reddit.subreddit = value.trim_start_matches("r/").to_string(),
            "limit" => self.reddit.limit = value.parse().map_err(|e| invalid(format!("{e}")))?,
            "query" => self.pexels.query = value.to_string(),
            "per_page" => {
                self.pexels.per_page = value.parse().map_err(|e| invalid(format!("{e}")))?
            }
            _ => return Err(Error::Config(format!("unknown key: {key}"))),
        }
        Ok(())
    }

    fn to_file(&self) -> ConfigFile {
        ConfigFile {
            common: CommonConfig {
                wallpaper_dir: self.wallpaper_dir_setting.clone(),
                source: self.default_source,
                style: self.style,
                timeout_secs: self.timeout.as_secs(),
            },
            source: SourceConfigs {
                bing: self.bing.clone(),
                reddit: self.reddit.clone(),
                // 来自环境变量的 key 不写入文件
                pexels: self.pexels.clone(),
            },
        }
    }

    /// 将配置保存回文件
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(&self.to_file())
            .map_err(|e| Error::Config(e.to_string()))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> Result<String> {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).map_err(|e| Error::Config(e.to_string()))
    }

    /// 将当前配置转换为 TOML 字符串
    pub fn to_toml(&self) -> String {
        let toml_str = toml::to_string_pretty(&self.to_file())
            .unwrap_or_else(|_| "# Error serializing config".to_string());

        // toml 库不支持带注释序列化，所以手动插入
        toml_str.replace(
            "[source.pexels]",
            "# 可选来源: bing (default), reddit, pexels\n# 使用 pexels 需要 api_key 或环境变量 PEXELS_API_KEY\n[source.pexels]",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(content: &str, env_key: Option<&str>) -> AppConfig {
        let file = AppConfig::parse(content).unwrap();
        AppConfig::from_file(
            file,
            PathBuf::from("/home/ann/.config/wallsets/config.toml"),
            PathBuf::from("/home/ann"),
            Path::new("/home/ann/Pictures"),
            env_key.map(str::to_string),
        )
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = from_toml("", None);
        assert_eq!(config.default_source, SourceKind::Bing);
        assert_eq!(config.style, WallpaperStyle::Stretched);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.wallpaper_dir,
            PathBuf::from("/home/ann/Pictures/Wallpapers")
        );
        assert_eq!(config.bing.market, "en-US");
        assert_eq!(config.reddit.subreddit, "wallpaper");
        assert_eq!(config.reddit.limit, 3);
        assert_eq!(config.pexels.query, "nature");
        assert!(config.pexels_api_key.is_none());
    }

    #[test]
    fn file_values_are_read() {
        let config = from_toml(
            r#"
            [common]
            wallpaper_dir = "walls"
            source = "reddit"
            style = "tiled"
            timeout_secs = 5

            [source.reddit]
            subreddit = "EarthPorn"
            limit = 10

            [source.pexels]
            api_key = "from-file"
            "#,
            None,
        );
        assert_eq!(config.default_source, SourceKind::Reddit);
        assert_eq!(config.style, WallpaperStyle::Tiled);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.wallpaper_dir, PathBuf::from("/home/ann/walls"));
        assert_eq!(config.reddit.subreddit, "EarthPorn");
        assert_eq!(config.reddit.limit, 10);
        assert_eq!(config.pexels_api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn env_key_wins_over_file() {
        let config = from_toml("[source.pexels]\napi_key = \"from-file\"\n", Some("from-env"));
        assert_eq!(config.pexels_api_key.as_deref(), Some("from-env"));
        // 环境变量里的 key 不会被写回文件
        assert!(config.to_toml().contains("from-file"));
        assert!(!config.to_toml().contains("from-env"));
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(AppConfig::parse("[common]\nsource = \"flickr\"\n").is_err());
    }

    #[test]
    fn set_updates_known_keys() {
        let mut config = from_toml("", None);
        config.set("source", "Pexels").unwrap();
        config.set("style", "centered").unwrap();
        config.set("timeout", "12").unwrap();
        config.set("subreddit", "r/wallpapers").unwrap();
        config.set("dir", "/data/walls").unwrap();

        assert_eq!(config.default_source, SourceKind::Pexels);
        assert_eq!(config.style, WallpaperStyle::Centered);
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.reddit.subreddit, "wallpapers");
        assert_eq!(config.wallpaper_dir, PathBuf::from("/data/walls"));
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut config = from_toml("", None);
        assert!(matches!(config.set("colour", "red"), Err(Error::Config(_))));
        assert!(matches!(config.set("style", "zoom"), Err(Error::Config(_))));
        assert!(matches!(config.set("timeout", "soon"), Err(Error::Config(_))));
    }

    #[test]
    fn save_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = from_toml("", None);
        config.config_path = dir.path().join("nested").join("config.toml");
        config.set("market", "ja-JP").unwrap();
        config.save().unwrap();

        let content = fs::read_to_string(&config.config_path).unwrap();
        let reloaded = AppConfig::parse(&content).unwrap();
        assert_eq!(reloaded.source.bing.market, "ja-JP");
        assert_eq!(reloaded.common.timeout_secs, 30);
    }

    #[test]
    fn default_dir_is_not_pinned_on_save() {
        let config = from_toml("", None);
        let reloaded = AppConfig::parse(&config.to_toml()).unwrap();
        assert!(reloaded.common.wallpaper_dir.is_none());

        let config = from_toml("[common]\nwallpaper_dir = \"~/walls\"\n", None);
        let reloaded = AppConfig::parse(&config.to_toml()).unwrap();
        assert_eq!(reloaded.common.wallpaper_dir.as_deref(), Some("~/walls"));
    }

    #[test]
    fn set_dir_is_saved_as_written() {
        let mut config = from_toml("", None);
        config.set("dir", "walls").unwrap();
        let reloaded = AppConfig::parse(&config.to_toml()).unwrap();
        assert_eq!(reloaded.common.wallpaper_dir.as_deref(), Some("walls"));
        assert_eq!(config.wallpaper_dir, PathBuf::from("/home/ann/walls"));
    }

    #[test]
    fn schema_mentions_sections() {
        let schema = AppConfig::get_schema().unwrap();
        assert!(schema.contains("common"));
        assert!(schema.contains("pexels"));
    }
}
