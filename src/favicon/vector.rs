//! # SVG 兜底模块
//!
//! 输入本身是 SVG 时原样透传；否则渲染 32×32 PNG 并以 data URL 内嵌到最小 SVG 中。
//! 兜底失败不影响整包生成，只会少一个 `favicon.svg`。

use base64::{Engine as _, engine::general_purpose};

use super::config::VECTOR_FALLBACK_EDGE;
use super::raster::{encode_png, Rasterizer};
use super::source::SourceImage;
use super::FaviconError;

/// 生成 `favicon.svg` 内容；无法生成时返回 `None`。
pub fn build_vector(source: &SourceImage, rasterizer: &Rasterizer) -> Option<Vec<u8>> {
    if source.is_vector() {
        return Some(source.bytes().to_vec());
    }

    match wrap_raster(source, rasterizer) {
        Ok(svg) => Some(svg.into_bytes()),
        Err(err) => {
            log::warn!("⚠️ SVG 兜底生成失败，跳过 favicon.svg：{}", err);
            None
        }
    }
}

fn wrap_raster(source: &SourceImage, rasterizer: &Rasterizer) -> Result<String, FaviconError> {
    let frame = rasterizer.resample(source.bitmap(), VECTOR_FALLBACK_EDGE)?;
    let png = encode_png(&frame)?;
    Ok(wrap_png_data_url(&png, VECTOR_FALLBACK_EDGE))
}

/// 以 `<image>` 元素内嵌 PNG 的 SVG 文档。
pub fn wrap_png_data_url(png: &[u8], edge: u32) -> String {
    let data_url = format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png));
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{edge}\" height=\"{edge}\" viewBox=\"0 0 {edge} {edge}\">\n  <image width=\"{edge}\" height=\"{edge}\" xlink:href=\"{data_url}\"/>\n</svg>"
    )
}
