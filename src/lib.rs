//! # 图标包生成工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 CLI (main.rs, clap)                      │
//! │   generate <ACTIVE> [--passive] [--output] [--out-dir]   │
//! │   inspect <ICO>                                          │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  ├─ settings ─── JSON 设置文件 → FaviconConfig            │
//! │  └─ favicon ──── 加载 · 重采样 · ICO · SVG · 打包         │
//! │       ├─ handler / session   编排与会话状态              │
//! │       ├─ raster / ico / vector                          │
//! │       ├─ manifest / snippet                             │
//! │       └─ archive / clipboard_writer                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有 CLI 命令的返回类型 |
//! | [`favicon`] | 从一张图片生成 PNG 全尺寸、`favicon.ico`、`favicon.svg`、manifest 与 HTML 片段 |
//! | [`settings`] | 读取 JSON 设置文件并覆盖默认配置 |

pub mod error;
pub mod favicon;
pub mod settings;
