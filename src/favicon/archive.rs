//! # 导出模块
//!
//! 将一次生成结果写成 `favicon-package.zip`，或展开为目录。
//! 导出失败只返回 `Archive` / `FileSystem` 错误，内存中的生成结果保持可用，
//! 重试导出无需重新渲染。

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::assembler::GeneratedPackage;
use super::FaviconError;

/// 默认压缩包文件名。
pub const ARCHIVE_FILE_NAME: &str = "favicon-package.zip";

/// 在内存中构建压缩包。
pub fn build_archive(package: &GeneratedPackage) -> Result<Vec<u8>, FaviconError> {
    let files = package.files()?;
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in &files {
        zip.start_file(name.as_str(), options)
            .map_err(|e| FaviconError::Archive(format!("写入 {} 失败：{}", name, e)))?;
        zip.write_all(content)
            .map_err(|e| FaviconError::Archive(format!("写入 {} 失败：{}", name, e)))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| FaviconError::Archive(format!("压缩包收尾失败：{}", e)))?;

    log::info!("🗜️ 压缩包构建完成 - {} 个文件", files.len());
    Ok(cursor.into_inner())
}

/// 构建并写出压缩包。
pub fn write_archive(package: &GeneratedPackage, path: &Path) -> Result<(), FaviconError> {
    let bytes = build_archive(package)?;
    std::fs::write(path, &bytes)
        .map_err(|e| FaviconError::Archive(format!("无法写出 {}：{}", path.display(), e)))?;

    log::info!(
        "💾 已写出 {}（{:.1} KB）",
        path.display(),
        bytes.len() as f64 / 1024.0
    );
    Ok(())
}

/// 将全部文件展开到目录，返回写出的路径（与压缩包内顺序一致）。
pub fn extract_to_dir(package: &GeneratedPackage, dir: &Path) -> Result<Vec<PathBuf>, FaviconError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| FaviconError::FileSystem(format!("无法创建目录 {}：{}", dir.display(), e)))?;

    package
        .files()?
        .into_iter()
        .map(|(name, content)| {
            let path = dir.join(&name);
            std::fs::write(&path, &content)
                .map_err(|e| FaviconError::FileSystem(format!("无法写出 {}：{}", path.display(), e)))?;
            Ok(path)
        })
        .collect()
}
