//! # 会话状态
//!
//! 一次交互会话内的输入与最近一次生成结果，以显式值传入编排层，不使用全局单例。
//!
//! - 每个角色最多一张图，重新提供时整体替换
//! - 只有生成成功才替换 `package`；失败时保留上一次结果

use std::sync::Arc;

use super::assembler::GeneratedPackage;
use super::source::{ImageRole, SourceImage};
use super::FaviconError;

#[derive(Debug, Clone, Default)]
pub struct FaviconSession {
    active: Option<Arc<SourceImage>>,
    passive: Option<Arc<SourceImage>>,
    package: Option<Arc<GeneratedPackage>>,
}

impl FaviconSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按图片自身角色放入对应槽位，返回被替换掉的旧图。
    pub fn set_source(&mut self, source: SourceImage) -> Option<Arc<SourceImage>> {
        let slot = match source.role() {
            ImageRole::Active => &mut self.active,
            ImageRole::Passive => &mut self.passive,
        };
        let previous = slot.replace(Arc::new(source));
        if previous.is_some() {
            log::debug!("♻️ 替换已有输入图片");
        }
        previous
    }

    pub fn clear_source(&mut self, role: ImageRole) -> Option<Arc<SourceImage>> {
        match role {
            ImageRole::Active => self.active.take(),
            ImageRole::Passive => self.passive.take(),
        }
    }

    pub fn source(&self, role: ImageRole) -> Option<&Arc<SourceImage>> {
        match role {
            ImageRole::Active => self.active.as_ref(),
            ImageRole::Passive => self.passive.as_ref(),
        }
    }

    /// 生成前置条件：必须已有 active 图。
    pub fn require_active(&self) -> Result<Arc<SourceImage>, FaviconError> {
        self.active
            .clone()
            .ok_or_else(|| FaviconError::InvalidInput("尚未提供 active 图标".to_string()))
    }

    pub fn passive(&self) -> Option<Arc<SourceImage>> {
        self.passive.clone()
    }

    pub fn can_generate(&self) -> bool {
        self.active.is_some()
    }

    /// 最近一次成功生成的图标包。
    pub fn package(&self) -> Option<&Arc<GeneratedPackage>> {
        self.package.as_ref()
    }

    /// 用整包替换上一次结果。
    pub fn store_package(&mut self, package: GeneratedPackage) -> Arc<GeneratedPackage> {
        let package = Arc::new(package);
        self.package = Some(Arc::clone(&package));
        package
    }
}
