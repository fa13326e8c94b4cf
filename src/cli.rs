// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义所有子命令和参数

use crate::setter::WallpaperStyle;
use crate::source::SourceKind;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// 每日壁纸工具
///
/// 从 Bing 每日一图、Reddit 热门帖子或 Pexels 搜索中挑选一张壁纸，
/// 下载到本地并设置为桌面背景。不带子命令时等同于 `wallsets set`。
#[derive(Parser, Debug)]
#[command(name = "wallsets")]
#[command(version)]
#[command(author)]
#[command(about = "Fetch a wallpaper of the day and set it as the desktop background")]
pub struct Cli {
    /// 壁纸来源（不指定则使用配置文件中的 source）
    #[arg(long, global = true, value_enum)]
    pub source: Option<SourceKind>,

    /// 显示样式（不指定则使用配置文件中的 style）
    #[arg(long, global = true, value_enum)]
    pub style: Option<WallpaperStyle>,

    /// 网络请求超时时间（秒）
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 获取、下载并设置为系统壁纸（默认）
    ///
    /// 用法示例:
    ///   wallsets set
    ///   wallsets set --source reddit --style centered
    Set,

    /// 只获取并下载，不设置壁纸
    ///
    /// 用法示例:
    ///   wallsets fetch --source pexels
    Fetch,

    /// 将本地指定的图片设置为系统壁纸
    ///
    /// 用法示例:
    ///   wallsets apply ~/Pictures/Wallpapers/MistyFjord.jpg --style tiled
    Apply {
        /// 图片的本地路径
        image: String,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   wallsets completions zsh > ~/.zsh/completions/_wallsets
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   wallsets config show
    ///   wallsets config set source reddit
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// 配置管理操作
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// 查看当前所有配置简报
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印当前完整配置内容
    Dump,
    /// 设置配置项的值 (source, style, timeout, dir, market, subreddit, limit, query, per_page)
    Set {
        /// 要设置的键
        key: String,
        /// 要设置的值
        value: String,
    },
}
