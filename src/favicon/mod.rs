//! # 图标包生成模块（favicon）
//!
//! ## 设计思路
//!
//! 该模块将“输入加载校验 → 多尺寸重采样 → ICO 编码 → SVG 兜底 → manifest/HTML 片段 → 打包导出”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线（配置快照、并发渲染、导出、复制）
//! - `session`：一次会话内的 active/passive 输入与最近一次结果
//! - `loader`：负责文件/字节/Base64 加载与类型、体积校验
//! - `raster`：负责方形重采样与 PNG 编码
//! - `ico`：ICO 容器逐字节编码
//! - `vector`：`favicon.svg` 透传或内嵌位图
//! - `assembler`：固定顺序组装全部产物
//! - `manifest` / `snippet`：`manifest.json` 与 HTML 片段
//! - `archive`：`favicon-package.zip` 与目录导出
//! - `clipboard_writer`：复制 HTML 片段与重试
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! main.rs（CLI 参数）
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs（加载 + 类型/体积校验 + 解码）
//!    ├─ assembler.rs（按尺寸渲染 → ico → svg → manifest → 片段）
//!    │     ├─ raster.rs
//!    │     ├─ ico.rs
//!    │     └─ vector.rs
//!    ├─ archive.rs（压缩包 / 目录）
//!    └─ clipboard_writer.rs（复制片段 + 重试）
//!    ↓
//! 返回 FaviconError 给入口层
//! ```

pub mod archive;
pub mod assembler;
mod clipboard_writer;
mod config;
mod error;
mod handler;
pub mod ico;
mod loader;
pub mod manifest;
pub mod raster;
mod session;
pub mod snippet;
mod source;
pub mod vector;

pub use assembler::{
    ArtifactOrigin, GeneratedArtifact, GeneratedPackage, PackageAssembler, SizeDescriptor,
};
pub use clipboard_writer::copy_text_with_retry;
pub use config::{FaviconConfig, QualityProfile, ICO_SIZES, PNG_SIZES, VECTOR_FALLBACK_EDGE};
pub use error::FaviconError;
pub use handler::FaviconHandler;
pub use loader::load_source;
pub use manifest::ManifestDocument;
pub use session::FaviconSession;
pub use snippet::EmbedSnippet;
pub use source::{DecodedBitmap, ImageRole, RasterFrame, SourceImage, SourceInput, SvgDocument, SVG_MIME};
