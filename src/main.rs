//! # 图标包生成工具 — 命令行入口
//!
//! 本文件仅负责参数解析、日志初始化与结果输出。
//! 业务逻辑分布在 `favicon` 模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use favicon_forge::error::AppError;
use favicon_forge::favicon::archive::{extract_to_dir, ARCHIVE_FILE_NAME};
use favicon_forge::favicon::ico::read_directory;
use favicon_forge::favicon::{
    FaviconConfig, FaviconHandler, FaviconSession, ImageRole, QualityProfile, SourceInput,
};
use favicon_forge::settings;

#[derive(Debug, Parser)]
#[command(name = "favicon-forge", version, about = "Generate a complete favicon package from one image")]
struct Cli {
    /// 以 JSON 输出结果与错误
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 生成 favicon-package.zip
    Generate {
        /// 常规图标（PNG/JPEG/WebP/GIF/BMP/SVG…）
        active: PathBuf,
        /// 窗口失焦时显示的图标
        #[arg(long)]
        passive: Option<PathBuf>,
        /// 压缩包输出路径
        #[arg(short, long, default_value = ARCHIVE_FILE_NAME)]
        output: PathBuf,
        /// 同时把全部文件展开到该目录
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// JSON 设置文件
        #[arg(long)]
        config: Option<PathBuf>,
        /// 重采样档位：quality / balanced / speed
        #[arg(long)]
        profile: Option<String>,
        /// 把 HTML 片段复制到剪贴板
        #[arg(long)]
        copy_snippet: bool,
    },
    /// 查看 ICO 文件的目录项
    Inspect {
        ico: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                match serde_json::to_string(&err) {
                    Ok(line) => println!("{line}"),
                    Err(_) => eprintln!("{err}"),
                }
            } else {
                eprintln!("❌ {err}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Generate {
            active,
            passive,
            output,
            out_dir,
            config,
            profile,
            copy_snippet,
        } => {
            let config = match config {
                Some(path) => settings::load_settings(&path)?,
                None => FaviconConfig::default(),
            };
            let handler = FaviconHandler::new(config);
            if let Some(profile) = profile {
                handler.set_quality_profile(QualityProfile::parse(&profile)?)?;
            }

            let mut session = FaviconSession::new();
            handler.load_into_session(&mut session, path_input(&active)?, ImageRole::Active)?;
            if let Some(passive) = passive {
                handler.load_into_session(&mut session, path_input(&passive)?, ImageRole::Passive)?;
            }

            let package = handler.generate(&mut session).await?;
            handler.export_archive(&session, &output)?;
            if let Some(dir) = out_dir {
                extract_to_dir(&package, &dir)?;
            }

            if cli.json {
                let listing: Vec<_> = package
                    .artifacts
                    .iter()
                    .map(|a| {
                        serde_json::json!({
                            "name": a.name,
                            "size": a.size.to_string(),
                            "origin": a.origin.as_str(),
                            "bytes": a.content.len(),
                        })
                    })
                    .collect();
                let summary = serde_json::json!({
                    "archive": output.display().to_string(),
                    "artifacts": listing,
                    "snippet": package.snippet.as_str(),
                });
                println!("{summary}");
            } else {
                for artifact in &package.artifacts {
                    println!(
                        "{:<32} {:>8} {:>8} B",
                        artifact.name,
                        artifact.size.to_string(),
                        artifact.content.len()
                    );
                }
                println!("\n{}", package.snippet);
            }

            // 复制失败不影响已写出的压缩包
            if copy_snippet {
                if let Err(err) = handler.copy_snippet(&session).await {
                    log::warn!("⚠️ HTML 片段复制失败，请手动复制: {err}");
                }
            }
            Ok(())
        }
        Command::Inspect { ico } => {
            let bytes = std::fs::read(&ico)?;
            let entries = read_directory(&bytes)?;
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "#{i} {}x{} planes={} bpp={} size={} offset={}",
                    entry.edge(),
                    entry.edge(),
                    entry.planes,
                    entry.bit_count,
                    entry.size,
                    entry.offset
                );
            }
            Ok(())
        }
    }
}

fn path_input(path: &std::path::Path) -> Result<SourceInput, AppError> {
    let path = path
        .to_str()
        .ok_or_else(|| AppError::Usage(format!("路径不是有效 UTF-8: {}", path.display())))?;
    Ok(SourceInput::FilePath(path.to_string()))
}
