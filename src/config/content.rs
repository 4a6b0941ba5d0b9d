//! `[content]` section configuration.
//!
//! Where the post and page collections live and how their files are parsed.

use super::defaults;
use educe::Educe;
use serde::Deserialize;
use std::path::PathBuf;

/// `[content]` section in sheaf.toml.
///
/// # Example
/// ```toml
/// [content]
/// posts = "content/posts"
/// pages = "content/pages"
/// pattern = "*.md"
/// highlight_theme = "base16-ocean.light"
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContentSection {
    /// Directory of dated posts (`YYYY-MM-DD-slug.md`).
    #[serde(default = "defaults::content::posts")]
    #[educe(Default = defaults::content::posts())]
    pub posts: PathBuf,

    /// Directory of standalone pages (`slug.md`).
    #[serde(default = "defaults::content::pages")]
    #[educe(Default = defaults::content::pages())]
    pub pages: PathBuf,

    /// Glob matched against file names in both directories.
    #[serde(default = "defaults::content::pattern")]
    #[educe(Default = defaults::content::pattern())]
    pub pattern: String,

    /// Syntax highlighting theme for fenced code blocks.
    #[serde(default = "defaults::content::highlight_theme")]
    #[educe(Default = defaults::content::highlight_theme())]
    pub highlight_theme: String,
}
