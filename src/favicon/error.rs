//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载生成链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! `code()` / `stage()` 提供稳定的机器可读标识，CLI 输出与日志聚合都依赖它们。

/// 图标包生成统一错误类型。
///
/// 该类型会在入口层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum FaviconError {
    #[error("输入无效：{0}")]
    InvalidInput(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("生成失败：{0}")]
    Generation(String),

    #[error("打包错误：{0}")]
    Archive(String),

    #[error("剪贴板错误：{0}")]
    Clipboard(String),

    #[error("剪贴板忙：{0}")]
    ClipboardBusy(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("配置错误：{0}")]
    Config(String),
}

impl FaviconError {
    /// 稳定错误码，供 CLI 结构化输出使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Decode(_) => "decode_failed",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Generation(_) => "generation_failed",
            Self::Archive(_) => "archive_failed",
            Self::Clipboard(_) => "clipboard_failed",
            Self::ClipboardBusy(_) => "clipboard_busy",
            Self::FileSystem(_) => "file_system",
            Self::Config(_) => "config_invalid",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) | Self::FileSystem(_) => "load",
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Generation(_) => "generate",
            Self::Archive(_) => "export",
            Self::Clipboard(_) | Self::ClipboardBusy(_) => "clipboard",
            Self::Config(_) => "config",
        }
    }
}

impl From<FaviconError> for String {
    fn from(error: FaviconError) -> Self {
        error.to_string()
    }
}
