//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 复制 HTML 片段是独立、非致命的操作：失败只返回 `Clipboard` / `ClipboardBusy`，
//! 不影响已生成的图标包。
//!
//! ## 实现思路
//!
//! - 剪贴板被占用、暂时不可用时做有限重试（指数退避 + 抖动）。
//! - 重试受总预算约束，避免长时间阻塞。
//! - 平台不支持剪贴板时立即失败，不再重试。

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use super::{FaviconConfig, FaviconError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipboardFailureKind {
    Busy,
    Transient,
    Fatal,
}

#[derive(Debug, Clone)]
struct ClipboardWriteFailure {
    kind: ClipboardFailureKind,
    message: String,
}

impl ClipboardWriteFailure {
    fn from_arboard(operation: &str, error: arboard::Error) -> Self {
        let kind = match error {
            arboard::Error::ClipboardOccupied => ClipboardFailureKind::Busy,
            arboard::Error::ClipboardNotSupported => ClipboardFailureKind::Fatal,
            _ => ClipboardFailureKind::Transient,
        };
        Self {
            kind,
            message: format!("{}：{}", operation, error),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self.kind, ClipboardFailureKind::Busy | ClipboardFailureKind::Transient)
    }
}

/// 由配置推导出的重试参数。
#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    budget_ms: u64,
}

impl RetryPolicy {
    fn from_config(config: &FaviconConfig) -> Self {
        let base_delay_ms = config.clipboard_retry_delay.max(1);
        Self {
            attempts: config.clipboard_retries.max(1),
            base_delay_ms,
            max_delay_ms: config.clipboard_retry_max_delay_ms.max(base_delay_ms),
            budget_ms: config.clipboard_retry_max_total_ms,
        }
    }

    /// 第 `retry` 次重试前的等待：`base * 2^(retry-1)`，封顶后叠加至多 1/3 的抖动。
    fn delay_for(&self, retry: u32, seed: u64) -> u64 {
        let exp = self
            .base_delay_ms
            .saturating_mul(1_u64 << retry.saturating_sub(1).min(8));
        let capped = exp.min(self.max_delay_ms);
        let jitter_bound = (capped / 3).max(1);
        capped.saturating_add(mix(seed ^ u64::from(retry)) % (jitter_bound + 1))
    }

    fn fits_budget(&self, elapsed_ms: u64, wait_ms: u64) -> bool {
        elapsed_ms.saturating_add(wait_ms) <= self.budget_ms
    }
}

/// splitmix64 终混，足够打散重试时刻。
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn jitter_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ u64::from(std::process::id()).rotate_left(32)
}

fn try_write_text(text: &str) -> Result<(), ClipboardWriteFailure> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| ClipboardWriteFailure::from_arboard("无法访问剪贴板", e))?;

    clipboard
        .set_text(text)
        .map_err(|e| ClipboardWriteFailure::from_arboard("复制失败", e))
}

/// 将文本写入系统剪贴板（含重试）。阻塞调用。
pub fn copy_text_with_retry(text: &str, config: &FaviconConfig) -> Result<(), FaviconError> {
    log::debug!("📋 准备复制 HTML 片段 - {} 字节", text.len());

    let policy = RetryPolicy::from_config(config);
    let seed = jitter_seed();
    let started = Instant::now();
    let mut last_failure: Option<ClipboardWriteFailure> = None;

    for attempt in 1..=policy.attempts {
        if attempt > 1 {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            let wait_ms = policy.delay_for(attempt - 1, seed);

            if !policy.fits_budget(elapsed_ms, wait_ms) {
                log::warn!(
                    "⏱️ 放弃第 {} 次复制：再等 {}ms 将超出 {}ms 预算",
                    attempt,
                    wait_ms,
                    policy.budget_ms
                );
                break;
            }

            log::debug!("🔄 第 {}/{} 次复制，等待 {}ms", attempt, policy.attempts, wait_ms);
            std::thread::sleep(Duration::from_millis(wait_ms));
        }

        match try_write_text(text) {
            Ok(()) => {
                log::info!("✅ HTML 片段已复制 (尝试 {})", attempt);
                return Ok(());
            }
            Err(failure) => {
                log::warn!(
                    "❌ 尝试 {} 失败: {}（kind={:?}）",
                    attempt,
                    failure.message,
                    failure.kind
                );
                let retryable = failure.is_retryable();
                last_failure = Some(failure);
                if !retryable {
                    log::warn!("🛑 非可重试错误，提前终止重试");
                    break;
                }
            }
        }
    }

    match last_failure {
        Some(failure) if failure.kind == ClipboardFailureKind::Busy => {
            Err(FaviconError::ClipboardBusy(failure.message))
        }
        Some(failure) => Err(FaviconError::Clipboard(failure.message)),
        None => Err(FaviconError::Clipboard("重试预算耗尽".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(base: u64, max: u64, budget: u64) -> RetryPolicy {
        let config = FaviconConfig {
            clipboard_retries: 3,
            clipboard_retry_delay: base,
            clipboard_retry_max_delay_ms: max,
            clipboard_retry_max_total_ms: budget,
            ..FaviconConfig::default()
        };
        RetryPolicy::from_config(&config)
    }

    #[test]
    fn delay_grows_exponentially_with_bounded_jitter() {
        let p = policy(100, 900, 1800);
        for seed in [0, 1, 42, u64::MAX] {
            let delay = p.delay_for(4, seed);
            assert!((800..=1066).contains(&delay), "delay={delay}");
        }
    }

    #[test]
    fn delay_is_capped_by_max() {
        let p = policy(300, 500, 1800);
        let delay = p.delay_for(8, 7);

        assert!((500..=666).contains(&delay), "delay={delay}");
    }

    #[test]
    fn zero_settings_fall_back_to_minimums() {
        let config = FaviconConfig {
            clipboard_retries: 0,
            clipboard_retry_delay: 0,
            ..FaviconConfig::default()
        };
        let p = RetryPolicy::from_config(&config);

        assert_eq!(p.attempts, 1);
        assert_eq!(p.base_delay_ms, 1);
    }

    #[test]
    fn budget_check_includes_pending_wait() {
        let p = policy(100, 900, 1800);

        assert!(!p.fits_budget(1700, 120));
        assert!(p.fits_budget(1600, 120));
        assert!(p.fits_budget(0, 0));
    }

    #[test]
    fn unsupported_clipboard_is_not_retried() {
        let failure = ClipboardWriteFailure::from_arboard("复制失败", arboard::Error::ClipboardNotSupported);
        assert!(!failure.is_retryable());

        let busy = ClipboardWriteFailure::from_arboard("复制失败", arboard::Error::ClipboardOccupied);
        assert_eq!(busy.kind, ClipboardFailureKind::Busy);
        assert!(busy.is_retryable());
    }
}
