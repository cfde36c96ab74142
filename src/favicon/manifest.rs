//! Web App Manifest（`manifest.json`）。

use serde::{Deserialize, Serialize};

use super::{FaviconConfig, FaviconError};

/// manifest 中引用的 PNG 尺寸。
pub const MANIFEST_ICON_SIZES: [u32; 2] = [192, 512];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub name: String,
    pub short_name: String,
    pub icons: Vec<ManifestIcon>,
    pub theme_color: String,
    pub background_color: String,
    pub display: String,
}

impl ManifestDocument {
    /// 按配置构建 manifest；与是否存在 passive 图标无关。
    pub fn from_config(config: &FaviconConfig) -> Self {
        let icons = MANIFEST_ICON_SIZES
            .iter()
            .map(|size| ManifestIcon {
                src: config.asset_href(&format!("favicon-{size}x{size}.png")),
                sizes: format!("{size}x{size}"),
                mime: "image/png".to_string(),
            })
            .collect();

        Self {
            name: config.app_name.clone(),
            short_name: config.short_name.clone(),
            icons,
            theme_color: config.theme_color.clone(),
            background_color: config.background_color.clone(),
            display: config.display.clone(),
        }
    }

    /// 两空格缩进的 JSON 文本。
    pub fn to_json(&self) -> Result<String, FaviconError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FaviconError::Generation(format!("manifest 序列化失败：{}", e)))
    }
}
