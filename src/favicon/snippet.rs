//! # HTML 片段模块
//!
//! 生成 `favicon-html-code.txt`：引用全部资源的 `<link>`/`<meta>` 标签，
//! 存在 passive 图标时追加按窗口焦点切换图标的脚本。

use std::fmt;

use super::FaviconConfig;

/// 片段中以 `<link rel="icon" type="image/png">` 引用的尺寸（180 走 apple-touch-icon）。
const LINKED_PNG_SIZES: [u32; 3] = [16, 32, 48];
const LINKED_LARGE_PNG_SIZES: [u32; 3] = [192, 256, 512];
const APPLE_TOUCH_SIZE: u32 = 180;

/// 焦点切换脚本中 passive 状态使用的图标。
pub const PASSIVE_TOGGLE_ICON: &str = "favicon-passive-32x32.png";
/// 焦点切换脚本中 active 状态使用的图标。
pub const ACTIVE_TOGGLE_ICON: &str = "favicon.ico";

/// 可直接粘贴进 `<head>` 的文本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSnippet {
    text: String,
    has_toggle_script: bool,
}

impl EmbedSnippet {
    pub fn build(config: &FaviconConfig, has_passive: bool) -> Self {
        let href = |name: &str| config.asset_href(name);
        let mut lines = vec![
            "<!-- Favicon Package -->".to_string(),
            format!(
                "<link rel=\"icon\" href=\"{}\" sizes=\"32x32\">",
                href(ACTIVE_TOGGLE_ICON)
            ),
            format!(
                "<link rel=\"icon\" href=\"{}\" type=\"image/svg+xml\">",
                href("favicon.svg")
            ),
        ];

        let png_link = |size: u32| {
            format!(
                "<link rel=\"icon\" type=\"image/png\" sizes=\"{size}x{size}\" href=\"{}\">",
                href(&format!("favicon-{size}x{size}.png"))
            )
        };
        lines.extend(LINKED_PNG_SIZES.into_iter().map(&png_link));
        lines.push(format!(
            "<link rel=\"apple-touch-icon\" sizes=\"{s}x{s}\" href=\"{}\">",
            href(&format!("favicon-{s}x{s}.png", s = APPLE_TOUCH_SIZE)),
            s = APPLE_TOUCH_SIZE
        ));
        lines.extend(LINKED_LARGE_PNG_SIZES.into_iter().map(&png_link));
        lines.push(format!("<link rel=\"manifest\" href=\"{}\">", href("manifest.json")));
        lines.push(format!("<meta name=\"theme-color\" content=\"{}\">", config.theme_color));

        let mut text = lines.join("\n");
        text.push_str("\n\n");

        if has_passive {
            text.push_str(&toggle_script(
                &href(ACTIVE_TOGGLE_ICON),
                &href(PASSIVE_TOGGLE_ICON),
            ));
        }

        Self {
            text,
            has_toggle_script: has_passive,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn has_toggle_script(&self) -> bool {
        self.has_toggle_script
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for EmbedSnippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn toggle_script(active: &str, passive: &str) -> String {
    format!(
        r#"<!-- Dynamic Favicon Switching Script -->
<script>
  let isActive = true;
  const activeFavicon = '{active}';
  const passiveFavicon = '{passive}';

  function updateFavicon() {{
    const link = document.querySelector("link[rel='icon'][sizes='32x32']:not([type])");
    if (link) {{
      link.href = isActive ? activeFavicon : passiveFavicon;
    }}
  }}

  window.addEventListener('focus', () => {{
    isActive = true;
    updateFavicon();
  }});

  window.addEventListener('blur', () => {{
    isActive = false;
    updateFavicon();
  }});
</script>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_without_passive_has_no_script() {
        let snippet = EmbedSnippet::build(&FaviconConfig::default(), false);

        assert!(!snippet.has_toggle_script());
        assert!(!snippet.as_str().contains("<script>"));
        assert!(!snippet.as_str().contains("passive"));
    }

    #[test]
    fn snippet_references_all_linked_assets() {
        let text = EmbedSnippet::build(&FaviconConfig::default(), false).into_string();

        for size in [16, 32, 48, 180, 192, 256, 512] {
            assert!(
                text.contains(&format!("href=\"/favicon-{size}x{size}.png\"")),
                "missing {size}"
            );
        }
        assert!(!text.contains("favicon-64x64.png"));
        assert!(!text.contains("favicon-128x128.png"));
        assert!(text.contains("href=\"/favicon.ico\""));
        assert!(text.contains("href=\"/favicon.svg\" type=\"image/svg+xml\""));
        assert!(text.contains("<link rel=\"apple-touch-icon\" sizes=\"180x180\""));
        assert!(text.contains("<link rel=\"manifest\" href=\"/manifest.json\">"));
        assert!(text.contains("<meta name=\"theme-color\" content=\"#3b82f6\">"));
    }

    #[test]
    fn passive_adds_focus_blur_toggle() {
        let text = EmbedSnippet::build(&FaviconConfig::default(), true).into_string();

        assert!(text.contains("const activeFavicon = '/favicon.ico';"));
        assert!(text.contains("const passiveFavicon = '/favicon-passive-32x32.png';"));
        assert!(text.contains("addEventListener('focus'"));
        assert!(text.contains("addEventListener('blur'"));
        assert!(text.trim_end().ends_with("</script>"));
    }
}
