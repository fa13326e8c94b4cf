// main.rs — 程序入口
// 负责初始化日志和运行时、解析命令行参数、分发子命令
//
// 一次运行的流程：获取候选 -> 挑选 -> 下载 -> 设置壁纸，全程顺序执行，不重试

mod cli;
mod config;
mod download;
mod error;
mod selector;
mod setter;
mod source;

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales");

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands, ConfigAction};
use config::AppConfig;
use error::{Error, Result};
use rust_i18n::t;
use setter::{DesktopBackend, SystemDesktop, WallpaperStyle};
use source::SourceKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

/// 单线程运行时即可：所有步骤都是顺序执行的
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{}", t!("error", reason => e));
            ExitCode::from(code)
        }
    }
}

/// 默认只输出警告，-v 打开本程序的调试日志，RUST_LOG 优先
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        concat!(env!("CARGO_CRATE_NAME"), "=debug")
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Set);

    // 补全脚本不依赖配置文件
    if let Commands::Completions { shell } = command {
        generate(shell, &mut Cli::command(), "wallsets", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = AppConfig::load()?;
    let source_kind = cli.source.unwrap_or(config.default_source);
    let style = cli.style.unwrap_or(config.style);
    let timeout = cli
        .timeout
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or(config.timeout);

    match command {
        Commands::Set => {
            let image_path = handle_fetch(&config, source_kind, timeout).await?;
            handle_set(&SystemDesktop, &image_path, style);
        }
        Commands::Fetch => {
            handle_fetch(&config, source_kind, timeout).await?;
        }
        Commands::Apply { image } => {
            handle_apply(&SystemDesktop, &image, style)?;
        }
        Commands::Config { action } => {
            handle_config(&mut config, &action)?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// 获取候选、挑选最佳的一张并下载，返回保存路径
async fn handle_fetch(
    config: &AppConfig,
    source_kind: SourceKind,
    timeout: Duration,
) -> Result<PathBuf> {
    let client = source::http_client(timeout)?;
    let source = source::build(source_kind, config, client.clone())?;

    println!("{}", t!("fetch_start", source => source.name()));
    let candidates = source.fetch().await?;
    log::debug!("{} returned {} candidates", source.name(), candidates.len());
    for candidate in &candidates {
        log::debug!(
            "  {:?} popularity={:?} url={}",
            candidate.title,
            candidate.popularity,
            candidate.url
        );
    }

    let selection = selector::select_best(&candidates)?;
    println!("{}", t!("selected", name => selection.name));

    let save_path = download::download(&client, &selection, &config.wallpaper_dir).await?;
    println!("{}", t!("save_path", path => save_path.display()));

    Ok(save_path)
}

/// 设置壁纸；失败只记录警告，图片已经下载好了
fn handle_set(backend: &dyn DesktopBackend, image_path: &Path, style: WallpaperStyle) {
    println!("{}", t!("setting_wallpaper"));
    match setter::apply(backend, image_path, style) {
        Ok(()) => println!("{}", t!("set_done")),
        Err(e) => log::warn!("{}", t!("set_failed", reason => e)),
    }
}

/// 处理 apply 子命令：直接设置本地图片，失败即报错
fn handle_apply(backend: &dyn DesktopBackend, image: &str, style: WallpaperStyle) -> Result<()> {
    let expanded = shellexpand::tilde(image);
    let path = std::path::absolute(&*expanded)?;
    if !path.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a file", path.display()),
        )));
    }

    println!("{}", t!("setting_wallpaper"));
    println!("  -> {}", path.display());
    setter::apply(backend, &path, style)?;
    println!("{}", t!("set_done"));
    Ok(())
}

/// 处理 config 子命令：查看或修改配置
fn handle_config(config: &mut AppConfig, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", t!("config_title"));
            println!(
                "{}",
                t!("config_path", path => config.config_path.display())
            );
            println!(
                "{}",
                t!("config_wallpaper_dir", path => config.wallpaper_dir.display())
            );
            println!("{}", t!("config_source", source => config.default_source));
            println!(
                "{}",
                t!("config_style", style => format!("{:?}", config.style).to_lowercase())
            );
            println!(
                "{}",
                t!("config_timeout", secs => config.timeout.as_secs())
            );
            let key_state = if config.pexels_api_key.is_some() {
                t!("config_key_set")
            } else {
                t!("config_key_missing")
            };
            println!("{}", t!("config_pexels_key", state => key_state));
        }
        ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema()?);
        }
        ConfigAction::Dump => {
            println!("{}", config.to_toml());
        }
        ConfigAction::Set { key, value } => {
            if !config::SETTABLE_KEYS.contains(&key.as_str()) {
                return Err(Error::Config(
                    t!(
                        "config_error_unknown_key",
                        key => key,
                        keys => config::SETTABLE_KEYS.join(", ")
                    )
                    .to_string(),
                ));
            }
            config.set(key, value)?;
            config.save()?;
            println!("{}", t!("config_updated", key => key, value => value));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApplyFailure;
    use crate::setter::MockDesktopBackend;

    fn failing_desktop() -> MockDesktopBackend {
        let mut backend = MockDesktopBackend::new();
        backend.expect_persist_display_style().returning(|_| Ok(()));
        backend.expect_apply_wallpaper_now().times(1).returning(|p| {
            Err(ApplyFailure::ApplyNow {
                path: p.to_path_buf(),
                reason: "no desktop session".into(),
            })
        });
        backend
    }

    #[test]
    fn set_keeps_going_when_desktop_refuses() {
        // 图片已经下载，设置失败不影响退出码
        let backend = failing_desktop();
        handle_set(&backend, Path::new("/tmp/Fjord.jpg"), WallpaperStyle::Stretched);
    }

    #[test]
    fn apply_reports_desktop_failure() {
        let image = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        let backend = failing_desktop();

        let err = handle_apply(
            &backend,
            image.path().to_str().unwrap(),
            WallpaperStyle::Stretched,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Apply(ApplyFailure::ApplyNow { .. })));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn apply_rejects_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jpg");
        let mut backend = MockDesktopBackend::new();
        backend.expect_persist_display_style().never();
        backend.expect_apply_wallpaper_now().never();

        let err = handle_apply(
            &backend,
            missing.to_str().unwrap(),
            WallpaperStyle::Stretched,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
        assert_eq!(err.exit_code(), 1);
    }
}
