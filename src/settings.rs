//! 设置文件（JSON）读取。
//!
//! 所有字段可选，未出现的字段保留 `FaviconConfig::default()` 的值。

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::favicon::{FaviconConfig, FaviconError, QualityProfile};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaviconSettings {
    pub app_name: Option<String>,
    pub short_name: Option<String>,
    pub theme_color: Option<String>,
    pub background_color: Option<String>,
    pub display: Option<String>,
    pub asset_prefix: Option<String>,
    pub quality: Option<String>,
    pub max_file_size_mb: Option<u64>,
    pub clipboard_retries: Option<u32>,
}

impl FaviconSettings {
    /// 覆盖到配置上。
    pub fn apply(&self, config: &mut FaviconConfig) -> Result<(), FaviconError> {
        let overrides = [
            (&self.app_name, &mut config.app_name),
            (&self.short_name, &mut config.short_name),
            (&self.theme_color, &mut config.theme_color),
            (&self.background_color, &mut config.background_color),
            (&self.display, &mut config.display),
            (&self.asset_prefix, &mut config.asset_prefix),
        ];
        for (value, target) in overrides {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        if let Some(quality) = &self.quality {
            config.apply_quality_profile(QualityProfile::parse(quality)?);
        }

        if let Some(mb) = self.max_file_size_mb {
            if mb == 0 {
                return Err(FaviconError::Config("max_file_size_mb 必须大于 0".to_string()));
            }
            config.max_file_size = mb
                .checked_mul(1024 * 1024)
                .ok_or_else(|| FaviconError::Config(format!("max_file_size_mb 过大：{}", mb)))?;
        }

        if let Some(retries) = self.clipboard_retries {
            config.clipboard_retries = retries;
        }

        Ok(())
    }
}

/// 读取设置文件并应用到默认配置。
pub fn load_settings(path: &Path) -> Result<FaviconConfig, AppError> {
    let content = fs::read_to_string(path)?;
    let settings = serde_json::from_str::<FaviconSettings>(&content)
        .map_err(|e| FaviconError::Config(format!("解析设置文件失败: {}", e)))?;

    let mut config = FaviconConfig::default();
    settings.apply(&mut config)?;
    log::info!("⚙️ 已加载设置文件: {}", path.display());
    Ok(config)
}
