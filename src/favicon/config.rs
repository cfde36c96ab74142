//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `FaviconConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中质量档位（quality / balanced / speed）作为高层语义，映射到底层重采样滤镜。
//!
//! 尺寸列表与 ICO 内嵌尺寸属于输出契约，不可配置，以常量形式给出。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `QualityProfile` 负责档位字符串解析与反向输出。
//! - `apply_quality_profile` 将档位转换为具体滤镜。
//! - `infer_quality_profile` 用于从当前配置反推档位。

use image::imageops::FilterType;

use super::FaviconError;

/// PNG 输出尺寸（升序，决定产物顺序）。
pub const PNG_SIZES: [u32; 9] = [16, 32, 48, 64, 128, 180, 192, 256, 512];

/// 写入 `favicon.ico` 的尺寸（仅 active 角色）。
pub const ICO_SIZES: [u32; 3] = [16, 32, 48];

/// SVG 兜底内嵌位图的边长。
pub const VECTOR_FALLBACK_EDGE: u32 = 32;

/// 单个输入文件体积上限：10 MB。
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// 生成图标包的配置。
///
/// 字段覆盖了加载校验、重采样、manifest 与 HTML 片段四个阶段。
#[derive(Debug, Clone)]
pub struct FaviconConfig {
    /// 输入文件允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 重采样滤镜。
    pub resize_filter: FilterType,
    /// manifest `name`。
    pub app_name: String,
    /// manifest `short_name`。
    pub short_name: String,
    /// manifest `theme_color` 与 `<meta name="theme-color">`。
    pub theme_color: String,
    /// manifest `background_color`。
    pub background_color: String,
    /// manifest `display`。
    pub display: String,
    /// HTML 片段与 manifest 中资源路径前缀，默认站点根目录。
    pub asset_prefix: String,
    /// 复制 HTML 片段失败时最大重试次数。
    pub clipboard_retries: u32,
    /// 重试基础间隔（毫秒）。
    pub clipboard_retry_delay: u64,
    /// 单次复制流程允许的总重试预算（毫秒）。
    pub clipboard_retry_max_total_ms: u64,
    /// 单次退避延迟上限（毫秒）。
    pub clipboard_retry_max_delay_ms: u64,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_decoded_pixels: 40_000_000,
            resize_filter: FilterType::CatmullRom,
            app_name: "Your App".to_string(),
            short_name: "App".to_string(),
            theme_color: "#3b82f6".to_string(),
            background_color: "#ffffff".to_string(),
            display: "standalone".to_string(),
            asset_prefix: "/".to_string(),
            clipboard_retries: 3,
            clipboard_retry_delay: 100,
            clipboard_retry_max_total_ms: 1_800,
            clipboard_retry_max_delay_ms: 900,
        }
    }
}

/// 重采样质量档位（面向用户语义）。
///
/// - `Quality`：Lanczos3，最锐利
/// - `Balanced`：Catmull-Rom（双三次）
/// - `Speed`：双线性
///
/// 任何档位都不会退化为最近邻采样。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityProfile {
    Quality,
    Balanced,
    Speed,
}

impl QualityProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_forge::favicon::QualityProfile;
    ///
    /// let p = QualityProfile::parse("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), favicon_forge::favicon::FaviconError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, FaviconError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(FaviconError::Config(format!(
                "未知质量档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl FaviconConfig {
    /// 基于当前滤镜反推质量档位。
    pub fn infer_quality_profile(&self) -> QualityProfile {
        match self.resize_filter {
            FilterType::Lanczos3 => QualityProfile::Quality,
            FilterType::Triangle | FilterType::Nearest => QualityProfile::Speed,
            FilterType::CatmullRom | FilterType::Gaussian => QualityProfile::Balanced,
        }
    }

    /// 应用指定质量档位到实际滤镜。
    pub fn apply_quality_profile(&mut self, profile: QualityProfile) {
        self.resize_filter = match profile {
            QualityProfile::Quality => FilterType::Lanczos3,
            QualityProfile::Balanced => FilterType::CatmullRom,
            QualityProfile::Speed => FilterType::Triangle,
        };
    }

    /// 拼接资源路径，例如 `/favicon.ico`。
    pub fn asset_href(&self, file_name: &str) -> String {
        if self.asset_prefix.ends_with('/') {
            format!("{}{}", self.asset_prefix, file_name)
        } else {
            format!("{}/{}", self.asset_prefix, file_name)
        }
    }
}
