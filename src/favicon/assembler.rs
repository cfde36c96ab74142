//! # 图标包编排模块
//!
//! ## 设计思路
//!
//! `PackageAssembler` 把一次生成拆成固定顺序的可失败步骤：
//! 1. 按升序尺寸渲染 PNG（同一尺寸 active 在前、passive 在后）
//! 2. 用 active 的 16/32/48 帧编码 `favicon.ico`
//! 3. 生成 `favicon.svg`（尽力而为，失败跳过）
//! 4. 构建 manifest 与 HTML 片段
//!
//! 任一尺寸渲染失败即整体失败，不产出部分结果。
//!
//! ## 实现思路
//!
//! 渲染步骤（`render_png`）与收尾步骤（`finish`）拆开，
//! 同步路径顺序调用，异步路径（见 `handler.rs`）并发渲染后按同一顺序回填。

use std::fmt;
use std::time::Instant;

use bytes::Bytes;

use super::config::{ICO_SIZES, PNG_SIZES};
use super::ico::encode_container;
use super::manifest::ManifestDocument;
use super::raster::{encode_png, Rasterizer};
use super::snippet::EmbedSnippet;
use super::source::{ImageRole, RasterFrame, SourceImage};
use super::vector::build_vector;
use super::{FaviconConfig, FaviconError};

/// manifest 在压缩包中的文件名。
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
/// HTML 片段在压缩包中的文件名。
pub const SNIPPET_FILE_NAME: &str = "favicon-html-code.txt";
pub const ICO_FILE_NAME: &str = "favicon.ico";
pub const SVG_FILE_NAME: &str = "favicon.svg";

/// 产物的尺寸描述。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeDescriptor {
    Pixels(u32),
    /// ICO 多尺寸容器。
    Multi,
    /// SVG。
    Vector,
}

impl fmt::Display for SizeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(edge) => write!(f, "{edge}x{edge}"),
            Self::Multi => f.write_str("multi"),
            Self::Vector => f.write_str("vector"),
        }
    }
}

/// 产物来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    Active,
    Passive,
    Ico,
    Svg,
}

impl From<ImageRole> for ArtifactOrigin {
    fn from(role: ImageRole) -> Self {
        match role {
            ImageRole::Active => Self::Active,
            ImageRole::Passive => Self::Passive,
        }
    }
}

impl ArtifactOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passive => "passive",
            Self::Ico => "ico",
            Self::Svg => "svg",
        }
    }
}

/// 一个带名字的输出文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub name: String,
    pub content: Bytes,
    pub size: SizeDescriptor,
    pub origin: ArtifactOrigin,
}

impl GeneratedArtifact {
    /// 按角色命名 PNG：`favicon-{s}x{s}.png` / `favicon-passive-{s}x{s}.png`。
    pub fn png_name(role: ImageRole, edge: u32) -> String {
        match role {
            ImageRole::Active => format!("favicon-{edge}x{edge}.png"),
            ImageRole::Passive => format!("favicon-passive-{edge}x{edge}.png"),
        }
    }
}

/// 一次成功生成的完整结果。
#[derive(Debug, Clone)]
pub struct GeneratedPackage {
    pub artifacts: Vec<GeneratedArtifact>,
    pub manifest: ManifestDocument,
    pub snippet: EmbedSnippet,
}

impl GeneratedPackage {
    pub fn artifact(&self, name: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// 压缩包内的全部文件（产物按插入顺序，随后 manifest 与 HTML 片段）。
    pub fn files(&self) -> Result<Vec<(String, Bytes)>, FaviconError> {
        let mut files: Vec<(String, Bytes)> = self
            .artifacts
            .iter()
            .map(|a| (a.name.clone(), a.content.clone()))
            .collect();
        files.push((MANIFEST_FILE_NAME.to_string(), Bytes::from(self.manifest.to_json()?)));
        files.push((
            SNIPPET_FILE_NAME.to_string(),
            Bytes::from(self.snippet.as_str().to_string()),
        ));
        Ok(files)
    }
}

/// 一个已渲染并编码好的 PNG 及其原始帧。
#[derive(Debug, Clone)]
pub struct RenderedPng {
    pub role: ImageRole,
    pub frame: RasterFrame,
    pub png: Vec<u8>,
}

/// 图标包编排器。
#[derive(Debug, Clone)]
pub struct PackageAssembler {
    config: FaviconConfig,
    rasterizer: Rasterizer,
}

impl PackageAssembler {
    pub fn new(config: FaviconConfig) -> Self {
        let rasterizer = Rasterizer::new(config.resize_filter);
        Self { config, rasterizer }
    }

    pub fn config(&self) -> &FaviconConfig {
        &self.config
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// 顺序执行完整生成流程。
    pub fn generate(
        &self,
        active: &SourceImage,
        passive: Option<&SourceImage>,
    ) -> Result<GeneratedPackage, FaviconError> {
        let started = Instant::now();
        let mut rendered = Vec::with_capacity(PNG_SIZES.len() * 2);

        for edge in PNG_SIZES {
            rendered.push(Self::render_png(&self.rasterizer, active, edge)?);
            if let Some(passive) = passive {
                rendered.push(Self::render_png(&self.rasterizer, passive, edge)?);
            }
        }

        let package = self.finish(active, passive.is_some(), rendered)?;
        log::info!(
            "📦 图标包生成完成 - {} 个产物，耗时 {}ms",
            package.artifacts.len(),
            started.elapsed().as_millis()
        );
        Ok(package)
    }

    /// 渲染单个尺寸并编码 PNG。失败统一归为 `Generation`。
    pub fn render_png(
        rasterizer: &Rasterizer,
        source: &SourceImage,
        edge: u32,
    ) -> Result<RenderedPng, FaviconError> {
        let fail = |err: FaviconError| {
            FaviconError::Generation(format!("{} {}x{} 渲染失败：{}", source.role(), edge, edge, err))
        };
        let frame = rasterizer.resample(source.bitmap(), edge).map_err(fail)?;
        let png = encode_png(&frame).map_err(fail)?;

        Ok(RenderedPng {
            role: source.role(),
            frame,
            png,
        })
    }

    /// 由已按顺序排列的 PNG 构建其余产物。
    ///
    /// `rendered` 必须符合 `PNG_SIZES` 升序、同尺寸 active 在前的顺序。
    pub fn finish(
        &self,
        active: &SourceImage,
        has_passive: bool,
        rendered: Vec<RenderedPng>,
    ) -> Result<GeneratedPackage, FaviconError> {
        let mut artifacts = Vec::with_capacity(rendered.len() + 2);
        let mut ico_frames = Vec::with_capacity(ICO_SIZES.len());

        for item in rendered {
            let edge = item.frame.edge();
            if item.role == ImageRole::Active && ICO_SIZES.contains(&edge) {
                ico_frames.push(item.frame);
            }
            artifacts.push(GeneratedArtifact {
                name: GeneratedArtifact::png_name(item.role, edge),
                content: Bytes::from(item.png),
                size: SizeDescriptor::Pixels(edge),
                origin: item.role.into(),
            });
        }

        if ico_frames.len() != ICO_SIZES.len() {
            return Err(FaviconError::Generation(format!(
                "ICO 帧不完整：{} / {}",
                ico_frames.len(),
                ICO_SIZES.len()
            )));
        }

        let ico_started = Instant::now();
        artifacts.push(GeneratedArtifact {
            name: ICO_FILE_NAME.to_string(),
            content: Bytes::from(encode_container(&ico_frames)),
            size: SizeDescriptor::Multi,
            origin: ArtifactOrigin::Ico,
        });
        log::debug!("🧱 favicon.ico 编码完成，耗时 {}ms", ico_started.elapsed().as_millis());

        if let Some(svg) = build_vector(active, &self.rasterizer) {
            artifacts.push(GeneratedArtifact {
                name: SVG_FILE_NAME.to_string(),
                content: Bytes::from(svg),
                size: SizeDescriptor::Vector,
                origin: ArtifactOrigin::Svg,
            });
        }

        Ok(GeneratedPackage {
            artifacts,
            manifest: ManifestDocument::from_config(&self.config),
            snippet: EmbedSnippet::build(&self.config, has_passive),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favicon::source::DecodedBitmap;
    use image::{ImageBuffer, Rgba};

    fn raster_source(role: ImageRole, rgba: [u8; 4]) -> SourceImage {
        SourceImage::new(
            role,
            Bytes::new(),
            "image/png".to_string(),
            DecodedBitmap::Raster(ImageBuffer::from_pixel(64, 64, Rgba(rgba))),
            64,
            64,
        )
    }

    #[test]
    fn active_only_package_layout() {
        let assembler = PackageAssembler::new(FaviconConfig::default());
        let active = raster_source(ImageRole::Active, [200, 10, 10, 255]);

        let package = assembler.generate(&active, None).expect("generate");
        let names: Vec<&str> = package.artifacts.iter().map(|a| a.name.as_str()).collect();

        assert_eq!(
            names,
            [
                "favicon-16x16.png",
                "favicon-32x32.png",
                "favicon-48x48.png",
                "favicon-64x64.png",
                "favicon-128x128.png",
                "favicon-180x180.png",
                "favicon-192x192.png",
                "favicon-256x256.png",
                "favicon-512x512.png",
                "favicon.ico",
                "favicon.svg",
            ]
        );
        assert!(!package.snippet.has_toggle_script());
    }

    #[test]
    fn passive_pngs_follow_their_active_size() {
        let assembler = PackageAssembler::new(FaviconConfig::default());
        let active = raster_source(ImageRole::Active, [200, 10, 10, 255]);
        let passive = raster_source(ImageRole::Passive, [10, 10, 200, 255]);

        let package = assembler.generate(&active, Some(&passive)).expect("generate");

        assert_eq!(package.artifacts[0].name, "favicon-16x16.png");
        assert_eq!(package.artifacts[1].name, "favicon-passive-16x16.png");
        assert_eq!(package.artifacts[1].origin, ArtifactOrigin::Passive);
        assert_eq!(package.artifacts[17].name, "favicon-passive-512x512.png");
        assert_eq!(package.artifacts[18].name, "favicon.ico");
        assert!(package.snippet.has_toggle_script());
    }

    #[test]
    fn finish_requires_all_ico_frames() {
        let assembler = PackageAssembler::new(FaviconConfig::default());
        let active = raster_source(ImageRole::Active, [0, 0, 0, 255]);
        let only_16 = vec![
            PackageAssembler::render_png(assembler.rasterizer(), &active, 16).expect("render"),
        ];

        assert!(matches!(
            assembler.finish(&active, false, only_16),
            Err(FaviconError::Generation(_))
        ));
    }

    #[test]
    fn package_files_append_manifest_and_snippet() {
        let assembler = PackageAssembler::new(FaviconConfig::default());
        let active = raster_source(ImageRole::Active, [0, 0, 0, 255]);
        let package = assembler.generate(&active, None).expect("generate");

        let files = package.files().expect("files");
        let n = files.len();
        assert_eq!(files[n - 2].0, MANIFEST_FILE_NAME);
        assert_eq!(files[n - 1].0, SNIPPET_FILE_NAME);
        assert_eq!(n, package.artifacts.len() + 2);
    }

    #[test]
    fn size_descriptor_display() {
        assert_eq!(SizeDescriptor::Pixels(48).to_string(), "48x48");
        assert_eq!(SizeDescriptor::Multi.to_string(), "multi");
        assert_eq!(SizeDescriptor::Vector.to_string(), "vector");
    }
}
