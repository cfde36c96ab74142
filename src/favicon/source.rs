//! # 中间数据模型
//!
//! 定义加载、解码、重采样三个阶段之间流转的数据结构。

use std::fmt;

use bytes::Bytes;
use image::RgbaImage;
use resvg::usvg;

use super::FaviconError;

/// SVG 的 MIME 类型。
pub const SVG_MIME: &str = "image/svg+xml";

/// 输入图片的逻辑角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageRole {
    /// 常规图标，生成前必须存在。
    Active,
    /// 窗口失焦时切换的图标，可选。
    Passive,
}

impl ImageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passive => "passive",
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 输入来源。
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// 本地文件路径。
    FilePath(String),
    /// 调用方已读入的字节，可附带声明的 MIME。
    Bytes { bytes: Bytes, mime: Option<String> },
    /// Base64 字符串或 `data:` URL。
    Base64(String),
}

/// 加载阶段产出的原始字节（尚未解码）。
#[derive(Debug, Clone)]
pub(crate) struct RawImageData {
    pub(crate) bytes: Bytes,
    pub(crate) mime: String,
    pub(crate) source_hint: &'static str,
}

/// 已解析的 SVG 文档。
///
/// 只保留源字节与固有尺寸，渲染时按需重建 `usvg::Tree`，
/// 使 `SourceImage` 可以跨线程共享。
#[derive(Debug, Clone)]
pub struct SvgDocument {
    data: Bytes,
    width: f32,
    height: f32,
}

impl SvgDocument {
    /// 解析并校验 SVG 字节。
    pub fn parse(data: Bytes) -> Result<Self, FaviconError> {
        let tree = Self::build_tree(&data)?;
        let size = tree.size();
        Ok(Self {
            data,
            width: size.width(),
            height: size.height(),
        })
    }

    pub(crate) fn tree(&self) -> Result<usvg::Tree, FaviconError> {
        Self::build_tree(&self.data)
    }

    fn build_tree(data: &[u8]) -> Result<usvg::Tree, FaviconError> {
        usvg::Tree::from_data(data, &usvg::Options::default())
            .map_err(|e| FaviconError::Decode(format!("SVG 解析失败：{}", e)))
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

/// 解码后的位图句柄。
#[derive(Debug, Clone)]
pub enum DecodedBitmap {
    /// 光栅图（PNG/JPEG/WebP/GIF/BMP/ICO…），统一为 RGBA8。
    Raster(RgbaImage),
    /// 矢量图，按目标尺寸直接渲染。
    Vector(SvgDocument),
}

/// 用户提供的一张输入图片。
///
/// 创建后不可变；同一角色重新提供文件时整体替换。
#[derive(Debug, Clone)]
pub struct SourceImage {
    role: ImageRole,
    bytes: Bytes,
    mime: String,
    bitmap: DecodedBitmap,
    width: u32,
    height: u32,
}

impl SourceImage {
    pub(crate) fn new(
        role: ImageRole,
        bytes: Bytes,
        mime: String,
        bitmap: DecodedBitmap,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            role,
            bytes,
            mime,
            bitmap,
            width,
            height,
        }
    }

    pub fn role(&self) -> ImageRole {
        self.role
    }

    /// 原始文件字节。
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// 声明的 MIME 类型。
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bitmap(&self) -> &DecodedBitmap {
        &self.bitmap
    }

    /// 固有像素尺寸 `(width, height)`。
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_vector(&self) -> bool {
        self.mime == SVG_MIME
    }
}

/// 某一尺寸下的方形 RGBA 像素缓冲。
#[derive(Clone, PartialEq, Eq)]
pub struct RasterFrame {
    edge: u32,
    pixels: Vec<u8>,
}

impl RasterFrame {
    /// 构建帧并校验 `pixels.len() == edge² × 4`。
    pub fn new(edge: u32, pixels: Vec<u8>) -> Result<Self, FaviconError> {
        if edge == 0 {
            return Err(FaviconError::Generation("帧边长必须为正整数".to_string()));
        }

        let expected = Self::expected_len(edge);
        if pixels.len() != expected {
            return Err(FaviconError::Generation(format!(
                "帧缓冲长度异常：{}（{}x{} 期望 {}）",
                pixels.len(),
                edge,
                edge,
                expected
            )));
        }

        Ok(Self { edge, pixels })
    }

    /// `edge × edge × 4`。
    pub fn expected_len(edge: u32) -> usize {
        (edge as usize) * (edge as usize) * 4
    }

    pub fn edge(&self) -> u32 {
        self.edge
    }

    /// 自上而下、RGBA 顺序的像素数据。
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for RasterFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterFrame")
            .field("edge", &self.edge)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_frame_rejects_mismatched_buffer() {
        assert!(RasterFrame::new(16, vec![0; 16 * 16 * 4]).is_ok());
        assert!(matches!(
            RasterFrame::new(16, vec![0; 16 * 16 * 3]),
            Err(FaviconError::Generation(_))
        ));
        assert!(matches!(
            RasterFrame::new(0, Vec::new()),
            Err(FaviconError::Generation(_))
        ));
    }

    #[test]
    fn svg_document_reads_intrinsic_size() {
        let svg = Bytes::from_static(
            br#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="48"><rect width="64" height="48" fill="red"/></svg>"#,
        );
        let doc = SvgDocument::parse(svg).expect("valid svg");

        assert_eq!(doc.width(), 64.0);
        assert_eq!(doc.height(), 48.0);
    }

    #[test]
    fn svg_document_rejects_garbage() {
        let result = SvgDocument::parse(Bytes::from_static(b"<svg width=\"10\""));
        assert!(matches!(result, Err(FaviconError::Decode(_))));
    }
}
