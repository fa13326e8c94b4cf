// error.rs — 错误类型定义
// 一次运行中所有可能失败的步骤都汇总到这里

use std::path::PathBuf;
use thiserror::Error;

/// 设置系统壁纸失败
///
/// 与其它错误分开定义：调用方通常只记录警告，不会中断程序
#[derive(Debug, Error)]
pub enum ApplyFailure {
    /// 持久化显示样式失败（如注册表写入被拒绝）
    #[error("failed to persist display style: {0}")]
    PersistStyle(String),

    /// 通知系统立即应用壁纸失败
    #[error("failed to apply wallpaper {path}: {reason}")]
    ApplyNow { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    /// 网络请求失败或服务端返回非 2xx 状态码
    #[error("source {source_name} unavailable: {reason}")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    /// 响应体与预期结构不符
    #[error("unexpected response from {source_name}: {reason}")]
    ParseFailure {
        source_name: &'static str,
        reason: String,
    },

    #[error("no candidates to choose from")]
    EmptyInput,

    #[error("first candidate has no popularity score")]
    MissingBaseline,

    #[error("first candidate has a zero popularity score")]
    InvalidBaseline,

    #[error(transparent)]
    Apply(#[from] ApplyFailure),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn unavailable(source_name: &'static str, err: impl std::fmt::Display) -> Self {
        Error::SourceUnavailable {
            source_name,
            reason: err.to_string(),
        }
    }

    pub fn parse(source_name: &'static str, err: impl std::fmt::Display) -> Self {
        Error::ParseFailure {
            source_name,
            reason: err.to_string(),
        }
    }

    /// 进程退出码
    /// - 2: 获取或解析壁纸源失败
    /// - 3: 候选列表不满足挑选条件
    /// - 1: 其它错误
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::SourceUnavailable { .. } | Error::ParseFailure { .. } => 2,
            Error::EmptyInput | Error::MissingBaseline | Error::InvalidBaseline => 3,
            Error::Apply(_) | Error::Io(_) | Error::Config(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
