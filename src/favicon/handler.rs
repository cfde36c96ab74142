//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `FaviconHandler` 只负责流程编排与配置管理，会话状态由调用方以 `FaviconSession` 显式传入。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 加载并解码输入，放入会话
//! 3. 生成图标包（成功才写回会话）
//! 4. 导出压缩包 / 复制 HTML 片段（均不触发重新生成）
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<FaviconConfig>>` 支持运行时切换质量档位。
//! - 单次生成使用“同一配置快照”，避免处理中途配置漂移。
//! - 异步生成把每个（尺寸, 角色）的渲染放到阻塞线程池并发执行，
//!   再按固定顺序 await 回填，保证产物顺序与同步路径完全一致。

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::archive::{build_archive, write_archive};
use super::assembler::{GeneratedPackage, PackageAssembler};
use super::clipboard_writer::copy_text_with_retry;
use super::config::PNG_SIZES;
use super::loader::load_source;
use super::session::FaviconSession;
use super::source::{ImageRole, SourceInput};
use super::{FaviconConfig, FaviconError, QualityProfile};

/// 图标包生成器。
pub struct FaviconHandler {
    config: Arc<RwLock<FaviconConfig>>,
}

impl FaviconHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_forge::favicon::{FaviconConfig, FaviconHandler};
    ///
    /// let handler = FaviconHandler::new(FaviconConfig::default());
    /// assert!(handler.config_snapshot().is_ok());
    /// ```
    pub fn new(config: FaviconConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照，保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<FaviconConfig, FaviconError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| FaviconError::Config("配置读取锁已中毒".to_string()))
    }

    /// 切换重采样质量档位。
    pub fn set_quality_profile(&self, profile: QualityProfile) -> Result<(), FaviconError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| FaviconError::Config("配置写入锁已中毒".to_string()))?;
        config.apply_quality_profile(profile);

        log::info!(
            "⚙️ 已切换质量档位：{:?}（filter={:?}）",
            profile,
            config.resize_filter
        );
        Ok(())
    }

    pub fn quality_profile(&self) -> Result<QualityProfile, FaviconError> {
        Ok(self.config_snapshot()?.infer_quality_profile())
    }

    /// 加载一张输入并放入会话；失败时会话保持不变。
    pub fn load_into_session(
        &self,
        session: &mut FaviconSession,
        input: SourceInput,
        role: ImageRole,
    ) -> Result<(), FaviconError> {
        let config = self.config_snapshot()?;
        let started = Instant::now();
        let source = load_source(input, role, &config)?;
        session.set_source(source);
        log::info!("⏱️ {} 加载耗时 {}ms", role, started.elapsed().as_millis());
        Ok(())
    }

    /// 同步生成。成功后整包替换会话中的结果。
    pub fn generate_blocking(
        &self,
        session: &mut FaviconSession,
    ) -> Result<Arc<GeneratedPackage>, FaviconError> {
        let active = session.require_active()?;
        let passive = session.passive();
        let assembler = PackageAssembler::new(self.config_snapshot()?);

        let package = assembler.generate(&active, passive.as_deref())?;
        Ok(session.store_package(package))
    }

    /// 并发渲染各尺寸后按固定顺序组装。
    ///
    /// 任一渲染失败即返回错误，会话中的上一次结果不受影响。
    pub async fn generate(
        &self,
        session: &mut FaviconSession,
    ) -> Result<Arc<GeneratedPackage>, FaviconError> {
        let active = session.require_active()?;
        let passive = session.passive();
        let has_passive = passive.is_some();
        let assembler = PackageAssembler::new(self.config_snapshot()?);
        let rasterizer = *assembler.rasterizer();
        let started = Instant::now();

        let mut jobs = Vec::with_capacity(PNG_SIZES.len() * 2);
        for edge in PNG_SIZES {
            for source in std::iter::once(&active).chain(passive.as_ref()) {
                let source = Arc::clone(source);
                jobs.push(tokio::task::spawn_blocking(move || {
                    PackageAssembler::render_png(&rasterizer, &source, edge)
                }));
            }
        }

        // 全部任务结束后再按顺序取第一个错误，返回时不留下仍在运行的渲染任务
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            results.push(
                job.await
                    .map_err(|e| FaviconError::Generation(format!("渲染线程执行失败：{}", e)))
                    .and_then(|item| item),
            );
        }
        let rendered = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        log::info!("🖼️ PNG 渲染完成 - {} 张，耗时 {}ms", rendered.len(), started.elapsed().as_millis());

        let package = tokio::task::spawn_blocking(move || assembler.finish(&active, has_passive, rendered))
            .await
            .map_err(|e| FaviconError::Generation(format!("组装线程执行失败：{}", e)))??;

        log::info!(
            "📦 图标包生成完成 - {} 个产物，总耗时 {}ms",
            package.artifacts.len(),
            started.elapsed().as_millis()
        );
        Ok(session.store_package(package))
    }

    fn current_package(session: &FaviconSession) -> Result<Arc<GeneratedPackage>, FaviconError> {
        session
            .package()
            .cloned()
            .ok_or_else(|| FaviconError::Archive("尚未生成图标包".to_string()))
    }

    /// 将会话中最近一次结果写成压缩包。
    pub fn export_archive(&self, session: &FaviconSession, path: &Path) -> Result<(), FaviconError> {
        let package = Self::current_package(session)?;
        write_archive(&package, path)
    }

    /// 将会话中最近一次结果打包为内存字节。
    pub fn archive_bytes(&self, session: &FaviconSession) -> Result<Vec<u8>, FaviconError> {
        let package = Self::current_package(session)?;
        build_archive(&package)
    }

    /// 复制 HTML 片段到系统剪贴板。
    pub async fn copy_snippet(&self, session: &FaviconSession) -> Result<(), FaviconError> {
        let package = session
            .package()
            .cloned()
            .ok_or_else(|| FaviconError::Clipboard("尚未生成 HTML 片段".to_string()))?;
        let config = self.config_snapshot()?;

        tokio::task::spawn_blocking(move || copy_text_with_retry(package.snippet.as_str(), &config))
            .await
            .map_err(|e| FaviconError::Clipboard(format!("线程执行失败：{}", e)))?
    }
}
