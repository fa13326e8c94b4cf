// download.rs — 将选中的壁纸下载到本地
// 文件名取自壁纸标题，同名文件直接覆盖

use crate::error::{Error, Result};
use crate::selector::Selection;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// 标题为空或全是非法字符时使用的文件名
const FALLBACK_NAME: &str = "wallpaper";

/// 下载壁纸，返回保存后的完整路径
///
/// 保存目录不存在时会先创建
pub async fn download(
    client: &reqwest::Client,
    selection: &Selection,
    save_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(save_dir).await?;

    let bytes = client
        .get(&selection.url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::unavailable("download", e))?
        .bytes()
        .await
        .map_err(|e| Error::unavailable("download", e))?;

    log::debug!("downloaded {} bytes from {}", bytes.len(), selection.url);
    save(&bytes, &selection.name, save_dir).await
}

/// 把图片数据写到 `<save_dir>/<标题>.jpg`
pub async fn save(bytes: &[u8], title: &str, save_dir: &Path) -> Result<PathBuf> {
    let save_path = save_dir.join(format!("{}.jpg", file_stem(title)));

    let mut file = File::create(&save_path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;

    Ok(save_path)
}

/// 把标题转换为可以安全用作文件名的字符串
///
/// 路径分隔符和 Windows 文件名中的非法字符替换为 '_'
pub fn file_stem(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Windows 不允许文件名以点或空格结尾
    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
