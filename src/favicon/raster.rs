//! # 重采样模块
//!
//! ## 设计思路
//!
//! 将任意尺寸的输入拉伸到 `edge × edge` 的方形画布，不做裁剪或留边：
//! 输入被视为本就打算作为方形图标使用。
//!
//! ## 实现思路
//!
//! 1. 光栅图：优先 `fast_image_resize` 卷积缩放，失败时回退 `image::resize_exact`。
//! 2. 矢量图：`resvg` 按目标尺寸直接渲染，再反预乘为直通 alpha 的 RGBA。
//! 3. 输出统一封装为 `RasterFrame` 并校验缓冲长度。

use fast_image_resize as fr;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, RgbaImage};
use resvg::tiny_skia;

use super::source::{DecodedBitmap, RasterFrame, SvgDocument};
use super::FaviconError;

/// 单次重采样允许的最大边长。
pub const MAX_EDGE: u32 = 1024;

/// 方形重采样器。
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    filter: FilterType,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(FilterType::CatmullRom)
    }
}

impl Rasterizer {
    /// 最近邻滤镜会被提升为双线性。
    pub fn new(filter: FilterType) -> Self {
        let filter = match filter {
            FilterType::Nearest => FilterType::Triangle,
            other => other,
        };
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// 将位图缩放为 `edge × edge` 的 RGBA 帧。
    pub fn resample(&self, bitmap: &DecodedBitmap, edge: u32) -> Result<RasterFrame, FaviconError> {
        if edge == 0 || edge > MAX_EDGE {
            return Err(FaviconError::Generation(format!(
                "目标边长超出范围：{}（允许 1..={}）",
                edge, MAX_EDGE
            )));
        }

        let pixels = match bitmap {
            DecodedBitmap::Raster(image) => self.resample_raster(image, edge)?,
            DecodedBitmap::Vector(svg) => Self::render_vector(svg, edge)?,
        };

        log::debug!("🖼️ 重采样完成 - {}x{}", edge, edge);
        RasterFrame::new(edge, pixels)
    }

    fn resample_raster(&self, image: &RgbaImage, edge: u32) -> Result<Vec<u8>, FaviconError> {
        if image.width() == edge && image.height() == edge {
            return Ok(image.as_raw().clone());
        }

        match Self::resize_with_fast_image_resize(image, edge, self.filter) {
            Ok(pixels) => Ok(pixels),
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
                let resized = DynamicImage::ImageRgba8(image.clone()).resize_exact(edge, edge, self.filter);
                Ok(resized.to_rgba8().into_raw())
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &RgbaImage,
        edge: u32,
        filter: FilterType,
    ) -> Result<Vec<u8>, FaviconError> {
        let src_image = fr::images::Image::from_vec_u8(
            image.width(),
            image.height(),
            image.as_raw().clone(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| FaviconError::Generation(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(edge, edge, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| FaviconError::Generation(format!("fast_image_resize 执行失败：{}", e)))?;

        Ok(dst_image.into_vec())
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest | FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }

    fn render_vector(svg: &SvgDocument, edge: u32) -> Result<Vec<u8>, FaviconError> {
        let tree = svg.tree()?;
        let size = tree.size();

        let mut pixmap = tiny_skia::Pixmap::new(edge, edge)
            .ok_or_else(|| FaviconError::Generation(format!("无法创建 {}x{} 画布", edge, edge)))?;

        let transform = tiny_skia::Transform::from_scale(
            edge as f32 / size.width(),
            edge as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        // tiny-skia 输出预乘 alpha
        let mut pixels = Vec::with_capacity(RasterFrame::expected_len(edge));
        for px in pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(pixels)
    }
}

/// 将帧编码为 PNG。
pub fn encode_png(frame: &RasterFrame) -> Result<Vec<u8>, FaviconError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            frame.pixels(),
            frame.edge(),
            frame.edge(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| FaviconError::Generation(format!("PNG 编码失败：{}", e)))?;
    Ok(buf)
}
