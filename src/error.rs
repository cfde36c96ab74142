//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义入口层统一的 `AppError` 枚举，CLI 中所有命令统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `FaviconError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize`，`--json` 输出时得到结构化的错误信息。

use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::favicon::FaviconError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图标包流水线错误（加载 / 生成 / 导出 / 复制）
    #[error("{0}")]
    Favicon(#[from] FaviconError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 命令行参数组合无效
    #[error("参数错误: {0}")]
    Usage(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Favicon(err) => err.code(),
            Self::Io(_) => "io",
            Self::Usage(_) => "usage",
        }
    }
}

/// 序列化为 `{ "code": ..., "message": ... }`。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
