// setter.rs — 系统壁纸设置模块
//
// 设置壁纸拆成两步：
// 1. 持久化显示样式（Windows 上即注册表中的 WallpaperStyle / TileWallpaper）
// 2. 通知系统立即使用新图片

use crate::error::ApplyFailure;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 壁纸显示样式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperStyle {
    /// 保持系统当前的样式
    Current,
    /// 居中
    Centered,
    /// 拉伸铺满
    #[default]
    Stretched,
    /// 平铺
    Tiled,
}

impl WallpaperStyle {
    /// 对应的系统设置 (fit mode, tile flag)，Current 表示不修改
    pub fn os_settings(self) -> Option<(u8, u8)> {
        match self {
            WallpaperStyle::Current => None,
            WallpaperStyle::Centered => Some((1, 0)),
            WallpaperStyle::Stretched => Some((2, 0)),
            WallpaperStyle::Tiled => Some((1, 1)),
        }
    }
}

/// 与操作系统交互的边界，测试中用 mock 替换
#[cfg_attr(test, mockall::automock)]
pub trait DesktopBackend {
    /// 保存显示样式，下次刷新壁纸时生效
    fn persist_display_style(&self, style: WallpaperStyle) -> Result<(), ApplyFailure>;

    /// 立即把指定图片设为桌面背景
    fn apply_wallpaper_now(&self, path: &Path) -> Result<(), ApplyFailure>;
}

/// Windows 上样式写不进注册表就不再刷新壁纸；
/// 其它平台很多桌面不支持设置样式，但仍然可以换图
const PERSIST_FAILURE_IS_FATAL: bool = cfg!(windows);

/// 将图片设置为壁纸
///
/// 样式为 Current 时跳过持久化。
/// 错误交给调用方决定是否中断。
pub fn apply(
    backend: &dyn DesktopBackend,
    path: &Path,
    style: WallpaperStyle,
) -> Result<(), ApplyFailure> {
    apply_with(backend, path, style, PERSIST_FAILURE_IS_FATAL)
}

fn apply_with(
    backend: &dyn DesktopBackend,
    path: &Path,
    style: WallpaperStyle,
    persist_failure_is_fatal: bool,
) -> Result<(), ApplyFailure> {
    if style != WallpaperStyle::Current {
        match backend.persist_display_style(style) {
            Ok(()) => {}
            Err(e) if persist_failure_is_fatal => return Err(e),
            Err(e) => log::warn!("{e}; applying the image with the current style"),
        }
    }
    backend.apply_wallpaper_now(path)
}

/// 真实的系统后端
pub struct SystemDesktop;

impl DesktopBackend for SystemDesktop {
    fn persist_display_style(&self, style: WallpaperStyle) -> Result<(), ApplyFailure> {
        let Some((fit, tile)) = style.os_settings() else {
            return Ok(());
        };
        log::debug!("persisting wallpaper style {style:?} (fit={fit}, tile={tile})");
        platform::persist(style, fit, tile)
    }

    fn apply_wallpaper_now(&self, path: &Path) -> Result<(), ApplyFailure> {
        let failure = |reason: String| ApplyFailure::ApplyNow {
            path: path.to_path_buf(),
            reason,
        };
        let path_str = path
            .to_str()
            .ok_or_else(|| failure("path is not valid UTF-8".to_string()))?;

        // 这个库会自动识别操作系统并调用相应的 API
        // Windows 上即 SystemParametersInfo(SPI_SETDESKWALLPAPER, ...)
        wallpaper::set_from_path(path_str).map_err(|e| failure(e.to_string()))
    }
}

#[cfg(windows)]
mod platform {
    use super::WallpaperStyle;
    use crate::error::ApplyFailure;
    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, KEY_SET_VALUE};

    pub fn persist(_style: WallpaperStyle, fit: u8, tile: u8) -> Result<(), ApplyFailure> {
        let failure = |e: std::io::Error| ApplyFailure::PersistStyle(e.to_string());

        let desktop = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags("Control Panel\\Desktop", KEY_SET_VALUE)
            .map_err(failure)?;
        // 两个值都是 REG_SZ
        desktop
            .set_value("WallpaperStyle", &fit.to_string())
            .map_err(failure)?;
        desktop
            .set_value("TileWallpaper", &tile.to_string())
            .map_err(failure)
    }
}

#[cfg(not(windows))]
mod platform {
    use super::WallpaperStyle;
    use crate::error::ApplyFailure;
    use wallpaper::Mode;

    pub fn persist(style: WallpaperStyle, _fit: u8, _tile: u8) -> Result<(), ApplyFailure> {
        let mode = match style {
            WallpaperStyle::Current => return Ok(()),
            WallpaperStyle::Centered => Mode::Center,
            WallpaperStyle::Stretched => Mode::Stretch,
            WallpaperStyle::Tiled => Mode::Tile,
        };
        wallpaper::set_mode(mode).map_err(|e| ApplyFailure::PersistStyle(e.to_string()))
    }
}
