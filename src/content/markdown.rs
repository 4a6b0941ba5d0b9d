//! Markdown to HTML conversion.
//!
//! Built on `pulldown-cmark` with two adjustments to its event stream:
//!
//! - raw HTML is never passed through; each block or inline tag becomes
//!   `<!-- raw HTML omitted -->`, and `javascript:`-style link targets are blanked
//! - fenced code blocks whose language `syntect` knows are replaced by
//!   pre-highlighted HTML with inline styles

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::sync::LazyLock;
use syntect::{
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::SyntaxSet,
};

/// Bundled syntax definitions (loaded once, shared by every generation).
static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Bundled highlighting themes.
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// URL schemes that are never emitted as link or image targets.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:", "file:"];

/// Whether `name` is one of the bundled highlighting themes.
pub fn has_theme(name: &str) -> bool {
    THEMES.themes.contains_key(name)
}

/// Converts Markdown bodies to sanitized HTML.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    theme: &'static Theme,
}

impl MarkdownRenderer {
    /// Create a renderer using one of the bundled themes.
    pub fn new(theme: &str) -> Option<Self> {
        THEMES.themes.get(theme).map(|theme| Self { theme })
    }

    /// Render `source` to HTML.
    ///
    /// Fails only if highlighting a recognised code block fails.
    pub fn render(&self, source: &str) -> Result<String, syntect::Error> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;

        let mut events: Vec<Event<'_>> = Vec::new();
        let mut in_html_block = false;
        // (language token, collected code) while inside a highlightable block
        let mut code: Option<(String, String)> = None;

        for event in Parser::new_ext(source, options) {
            if code.is_some() {
                match event {
                    Event::Text(text) => {
                        if let Some((_, buf)) = code.as_mut() {
                            buf.push_str(&text);
                        }
                    }
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((lang, buf)) = code.take() {
                            events.push(Event::Html(self.highlight(&lang, &buf)?.into()));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::HtmlBlock) => {
                    in_html_block = true;
                    events.push(Event::Html(RAW_HTML_OMITTED.into()));
                }
                Event::End(TagEnd::HtmlBlock) => in_html_block = false,
                Event::Html(_) if in_html_block => {}
                Event::Html(_) | Event::InlineHtml(_) => {
                    events.push(Event::InlineHtml(RAW_HTML_OMITTED.into()));
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info)))
                    if self.syntax_token(info).is_some() =>
                {
                    let lang = self.syntax_token(info).unwrap_or_default().to_owned();
                    code = Some((lang, String::new()));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url: sanitize_url(dest_url),
                    title,
                    id,
                })),
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url: sanitize_url(dest_url),
                    title,
                    id,
                })),
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out)
    }

    /// First token of a fence info string, if it names a known syntax.
    ///
    /// "rust,ignore" and "rust title=x" both resolve to "rust".
    fn syntax_token<'a>(&self, info: &'a str) -> Option<&'a str> {
        let token = info.split([',', ' ', '{']).next()?.trim();
        (!token.is_empty() && SYNTAXES.find_syntax_by_token(token).is_some()).then_some(token)
    }

    fn highlight(&self, lang: &str, code: &str) -> Result<String, syntect::Error> {
        let syntax = SYNTAXES
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
        highlighted_html_for_string(code, &SYNTAXES, syntax, self.theme)
    }
}

/// Blank out link targets using a script-capable scheme.
fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    let lower = url.trim_start().to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        CowStr::Borrowed("")
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new("InspiredGitHub").unwrap()
    }

    #[test]
    fn test_basic_markdown() {
        let html = renderer().render("# Title\n\nSome *emphasis*.").unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_raw_html_block_omitted() {
        let html = renderer()
            .render("before\n\n<div onclick=\"x()\">\n<script>alert(1)</script>\n</div>\n\nafter")
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("onclick"));
        assert_eq!(html.matches(RAW_HTML_OMITTED).count(), 1);
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_inline_html_omitted() {
        let html = renderer().render("hello <b>world</b>").unwrap();
        assert!(!html.contains("<b>"));
        assert!(html.contains("world"));
        assert!(html.contains(RAW_HTML_OMITTED));
    }

    #[test]
    fn test_script_links_blanked() {
        let html = renderer().render("[x](javascript:alert(1)) [y](https://ok.example)").unwrap();
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"https://ok.example\""));
    }

    #[test]
    fn test_fenced_code_highlighted() {
        let html = renderer().render("```rust\nfn main() {}\n```\n").unwrap();
        assert!(html.contains("<pre style=\""));
        assert!(html.contains("<span style="));
        assert!(html.contains("main"));
        assert!(!html.contains("language-rust"));
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let html = renderer()
            .render("```no-such-lang\n<tag> & text\n```\n")
            .unwrap();
        assert!(html.contains("<pre><code class=\"language-no-such-lang\">"));
        assert!(html.contains("&lt;tag&gt; &amp; text"));
    }

    #[test]
    fn test_tables_and_strikethrough() {
        let html = renderer().render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~").unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_theme_lookup() {
        assert!(has_theme("InspiredGitHub"));
        assert!(has_theme("base16-ocean.dark"));
        assert!(!has_theme("no-such-theme"));
        assert!(MarkdownRenderer::new("no-such-theme").is_none());
    }
}
