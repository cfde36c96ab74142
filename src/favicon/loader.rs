//! # 加载与解码模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / 内存字节 / Base64 与 data URL）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验：非图片类型、超过 10 MB 的输入在任何生成步骤之前被拒绝。
//!
//! ## 实现思路
//!
//! 1. 读取原始字节并做体积限制
//! 2. 确定 MIME：调用方声明优先，否则按文件签名（`infer`）与 SVG 文本特征嗅探
//! 3. 按 header 尺寸快速拒绝超大像素图
//! 4. 完整解码为 `DecodedBitmap`

use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

use super::source::{DecodedBitmap, ImageRole, RawImageData, SourceImage, SourceInput, SvgDocument, SVG_MIME};
use super::{FaviconConfig, FaviconError};

/// SVG 文本特征探测的字节数。
const SVG_SNIFF_BYTES: usize = 1024;

/// 加载、校验并解码一张输入图片。
pub fn load_source(
    input: SourceInput,
    role: ImageRole,
    config: &FaviconConfig,
) -> Result<SourceImage, FaviconError> {
    let raw = match input {
        SourceInput::FilePath(path) => load_from_file(&path, config)?,
        SourceInput::Bytes { bytes, mime } => load_from_bytes(bytes, mime.as_deref(), config)?,
        SourceInput::Base64(data) => load_from_base64(&data, config)?,
    };

    decode_source(raw, role, config)
}

/// 从本地路径加载图片原始字节。
pub(crate) fn load_from_file(path: &str, config: &FaviconConfig) -> Result<RawImageData, FaviconError> {
    log::info!("📁 开始读取本地图片 - 路径: {}", path);

    let file_path = Path::new(path);
    if !file_path.exists() {
        return Err(FaviconError::FileSystem(format!("文件不存在：{}", path)));
    }

    let metadata = std::fs::metadata(file_path)
        .map_err(|e| FaviconError::FileSystem(format!("无法读取文件信息：{}", e)))?;
    check_file_size(metadata.len(), config)?;

    let bytes = std::fs::read(file_path)
        .map_err(|e| FaviconError::FileSystem(format!("无法读取图片文件：{}", e)))?;

    let extension_hint = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("svg"))
        .map(|_| SVG_MIME);

    let bytes = Bytes::from(bytes);
    let mime = resolve_mime(&bytes, extension_hint)?;

    Ok(RawImageData {
        bytes,
        mime,
        source_hint: "file",
    })
}

/// 使用调用方已读入的字节。
pub(crate) fn load_from_bytes(
    bytes: Bytes,
    declared_mime: Option<&str>,
    config: &FaviconConfig,
) -> Result<RawImageData, FaviconError> {
    check_file_size(bytes.len() as u64, config)?;
    let mime = resolve_mime(&bytes, declared_mime)?;

    Ok(RawImageData {
        bytes,
        mime,
        source_hint: "bytes",
    })
}

/// 从 Base64 字符串或 `data:` URL 加载。
pub(crate) fn load_from_base64(data: &str, config: &FaviconConfig) -> Result<RawImageData, FaviconError> {
    log::info!("📝 开始处理 base64 图片");

    let normalized = data.trim();
    let (declared_mime, payload) = match normalized.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| FaviconError::InvalidInput("data URL 缺少数据段".to_string()))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| FaviconError::InvalidInput("缺少 base64 标记".to_string()))?;
            (Some(mime), payload)
        }
        None => (None, normalized),
    };

    check_file_size(estimate_base64_decoded_len(payload), config)?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| FaviconError::Decode(format!("Base64 解码失败：{}", e)))?;
    check_file_size(bytes.len() as u64, config)?;

    let bytes = Bytes::from(bytes);
    let mime = resolve_mime(&bytes, declared_mime)?;

    Ok(RawImageData {
        bytes,
        mime,
        source_hint: "base64",
    })
}

fn estimate_base64_decoded_len(data: &str) -> u64 {
    (data.len() as u64).div_ceil(4) * 3
}

fn check_file_size(len: u64, config: &FaviconConfig) -> Result<(), FaviconError> {
    if len == 0 {
        return Err(FaviconError::InvalidInput("图片内容为空".to_string()));
    }

    if len > config.max_file_size {
        return Err(FaviconError::InvalidInput(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            len as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

/// 确定输入 MIME，并拒绝非图片类型。
fn resolve_mime(bytes: &[u8], declared: Option<&str>) -> Result<String, FaviconError> {
    let mime = match declared {
        Some(declared) => normalize_mime(declared),
        None => sniff_mime(bytes)
            .ok_or_else(|| FaviconError::InvalidInput("无法识别图片类型".to_string()))?,
    };

    if !mime.starts_with("image/") {
        return Err(FaviconError::InvalidInput(format!("不是图片类型：{}", mime)));
    }

    Ok(mime)
}

fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `infer` 会把带 `<?xml` 声明的 SVG 识别为 `text/xml`，非图片结果需再做 SVG 文本探测。
fn sniff_mime(bytes: &[u8]) -> Option<String> {
    let inferred = infer::get(bytes).map(|kind| kind.mime_type());
    if let Some(mime) = inferred.filter(|mime| mime.starts_with("image/")) {
        return Some(mime.to_string());
    }

    if looks_like_svg(bytes) {
        return Some(SVG_MIME.to_string());
    }

    inferred.map(str::to_string)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_BYTES)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    (text.starts_with('<')) && text.contains("<svg")
}

/// 将原始字节解码为 `SourceImage`。
pub(crate) fn decode_source(
    raw: RawImageData,
    role: ImageRole,
    config: &FaviconConfig,
) -> Result<SourceImage, FaviconError> {
    if raw.mime == SVG_MIME {
        let svg = SvgDocument::parse(raw.bytes.clone())?;
        let width = svg.width().ceil() as u32;
        let height = svg.height().ceil() as u32;

        log::info!(
            "✅ SVG 解析成功 - 角色: {} 来源: {} 尺寸: {}x{}",
            role,
            raw.source_hint,
            width,
            height
        );
        return Ok(SourceImage::new(
            role,
            raw.bytes,
            raw.mime,
            DecodedBitmap::Vector(svg),
            width,
            height,
        ));
    }

    let (header_width, header_height) = inspect_dimensions_from_memory(&raw.bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|e| FaviconError::Decode(format!("图片解码失败：{}", e)))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    log::info!(
        "✅ 图片解码成功 - 角色: {} 来源: {} 类型: {} 尺寸: {}x{}",
        role,
        raw.source_hint,
        raw.mime,
        width,
        height
    );

    Ok(SourceImage::new(
        role,
        raw.bytes,
        raw.mime,
        DecodedBitmap::Raster(rgba),
        width,
        height,
    ))
}

/// 仅通过图片头信息读取宽高，用于完整解码前的像素限制检查。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), FaviconError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FaviconError::Decode(format!("无法识别图片格式：{}", e)))?
        .into_dimensions()
        .map_err(|e| FaviconError::Decode(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &FaviconConfig, width: u32, height: u32) -> Result<(), FaviconError> {
    let pixels = (width as u64) * (height as u64);
    if pixels > config.max_decoded_pixels {
        return Err(FaviconError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Write;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    const SVG: &[u8] =
        br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="24" height="24"><rect width="24" height="24"/></svg>"#;

    #[test]
    fn png_bytes_are_sniffed_and_decoded() {
        let source = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from(create_png_bytes(40, 30)),
                mime: None,
            },
            ImageRole::Active,
            &FaviconConfig::default(),
        )
        .expect("load should succeed");

        assert_eq!(source.mime(), "image/png");
        assert_eq!(source.dimensions(), (40, 30));
        assert!(matches!(source.bitmap(), DecodedBitmap::Raster(_)));
    }

    #[test]
    fn svg_text_is_sniffed() {
        let source = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from_static(SVG),
                mime: None,
            },
            ImageRole::Passive,
            &FaviconConfig::default(),
        )
        .expect("load should succeed");

        assert!(source.is_vector());
        assert_eq!(source.role(), ImageRole::Passive);
        assert_eq!(source.dimensions(), (24, 24));
    }

    #[test]
    fn plain_base64_svg_with_xml_declaration_is_sniffed() {
        let encoded = general_purpose::STANDARD.encode(SVG);
        let source = load_source(
            SourceInput::Base64(encoded),
            ImageRole::Active,
            &FaviconConfig::default(),
        )
        .expect("load should succeed");

        assert!(source.is_vector());
        assert_eq!(source.mime(), SVG_MIME);
        assert_eq!(&source.bytes()[..], SVG);
    }

    #[test]
    fn xml_without_svg_root_is_rejected() {
        let result = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from_static(b"<?xml version=\"1.0\"?><note>hi</note>"),
                mime: None,
            },
            ImageRole::Active,
            &FaviconConfig::default(),
        );

        assert!(matches!(result, Err(FaviconError::InvalidInput(_))));
    }

    #[test]
    fn non_image_payload_is_invalid_input() {
        let result = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from_static(b"hello world, definitely not an image"),
                mime: None,
            },
            ImageRole::Active,
            &FaviconConfig::default(),
        );
        assert!(matches!(result, Err(FaviconError::InvalidInput(_))));

        let declared_text = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from(create_png_bytes(4, 4)),
                mime: Some("text/plain".to_string()),
            },
            ImageRole::Active,
            &FaviconConfig::default(),
        );
        assert!(matches!(declared_text, Err(FaviconError::InvalidInput(_))));
    }

    #[test]
    fn oversized_input_is_rejected_before_decode() {
        let mut config = FaviconConfig::default();
        config.max_file_size = 64;

        let result = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from(create_png_bytes(64, 64)),
                mime: Some("image/png".to_string()),
            },
            ImageRole::Active,
            &config,
        );

        assert!(matches!(result, Err(FaviconError::InvalidInput(_))));
    }

    #[test]
    fn default_ceiling_is_ten_megabytes() {
        let bytes = Bytes::from(vec![0u8; 10 * 1024 * 1024 + 1]);
        let result = load_from_bytes(bytes, Some("image/png"), &FaviconConfig::default());

        assert!(matches!(result, Err(FaviconError::InvalidInput(_))));
    }

    #[test]
    fn corrupt_image_is_decode_failure() {
        let mut png = create_png_bytes(16, 16);
        png.truncate(40);

        let result = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from(png),
                mime: None,
            },
            ImageRole::Active,
            &FaviconConfig::default(),
        );

        assert!(matches!(result, Err(FaviconError::Decode(_))));
    }

    #[test]
    fn too_many_pixels_is_resource_limit() {
        let mut config = FaviconConfig::default();
        config.max_decoded_pixels = 100;

        let result = load_source(
            SourceInput::Bytes {
                bytes: Bytes::from(create_png_bytes(20, 20)),
                mime: None,
            },
            ImageRole::Active,
            &config,
        );

        assert!(matches!(result, Err(FaviconError::ResourceLimit(_))));
    }

    #[test]
    fn data_url_carries_declared_mime() {
        let encoded = general_purpose::STANDARD.encode(SVG);
        let source = load_source(
            SourceInput::Base64(format!("data:image/svg+xml;base64,{}", encoded)),
            ImageRole::Active,
            &FaviconConfig::default(),
        )
        .expect("load should succeed");

        assert_eq!(source.mime(), SVG_MIME);
        assert_eq!(source.bytes().as_ref(), SVG);
    }

    #[test]
    fn data_url_without_base64_marker_is_rejected() {
        let result = load_from_base64("data:image/png,abcd", &FaviconConfig::default());
        assert!(matches!(result, Err(FaviconError::InvalidInput(_))));
    }

    #[test]
    fn svg_extension_is_respected_for_files() {
        let mut file = tempfile::Builder::new()
            .suffix(".svg")
            .tempfile()
            .expect("tempfile");
        file.write_all(SVG).expect("write svg");

        let raw = load_from_file(
            file.path().to_str().expect("utf8 path"),
            &FaviconConfig::default(),
        )
        .expect("load should succeed");

        assert_eq!(raw.mime, SVG_MIME);
        assert_eq!(raw.source_hint, "file");
    }

    #[test]
    fn missing_file_is_file_system_error() {
        let result = load_from_file("/definitely/not/here.png", &FaviconConfig::default());
        assert!(matches!(result, Err(FaviconError::FileSystem(_))));
    }
}
