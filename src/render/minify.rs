//! HTML minification.
//!
//! The feed is not minified: `rss` already writes it on one line, and
//! text nodes must keep their newlines.

use std::borrow::Cow;

/// Minify `html` when `enabled`.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify(html: &[u8], enabled: bool) -> Cow<'_, [u8]> {
    if enabled {
        Cow::Owned(minify_html_inner(html))
    } else {
        Cow::Borrowed(html)
    }
}

fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    // "<!-- raw HTML omitted -->" markers go too
    cfg.keep_comments = false;
    cfg.minify_css = true;
    minify_html::minify(html, &cfg)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_html_basic() {
        let html = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify(html, true);
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("\n  "));
        assert!(result_str.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_minify_html_disabled_borrows() {
        let html = b"<html>\n  <body>\n  </body>\n</html>";
        let result = minify(html, false);

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html);
    }

    #[test]
    fn test_minify_html_keeps_highlighted_code() {
        let html = b"<pre style=\"color:#323232;\">\n<span style=\"color:#a71d5d;\">fn</span> main\n</pre>";
        let result = minify(html, true);
        let result_str = String::from_utf8_lossy(&result);

        assert!(result_str.contains("fn</span> main"));
    }
}
