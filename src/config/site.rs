//! `[site]` section configuration.
//!
//! Contains basic site information shown in page chrome and the RSS feed.

use super::defaults;
use educe::Educe;
use serde::Deserialize;

/// `[site]` section in sheaf.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [site]
/// title = "My Blog"
/// description = "Notes about Rust"
/// author = "Alice"
/// url = "https://myblog.com"
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Site title displayed in browser tab, headers and the feed.
    #[serde(default = "defaults::site::title")]
    #[educe(Default = defaults::site::title())]
    pub title: String,

    /// Site description for meta tags and the feed channel.
    #[serde(default)]
    pub description: String,

    /// Public base URL used for absolute links in the feed.
    /// When unset, the feed falls back to the request `Host` header.
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: Option<String>,

    /// Author name for the feed and page footer.
    #[serde(default = "defaults::site::author")]
    #[educe(Default = defaults::site::author())]
    pub author: String,

    /// BCP 47 language code (e.g., "en", "fr-CA").
    #[serde(default = "defaults::site::language")]
    #[educe(Default = defaults::site::language())]
    pub language: String,

    /// Number of posts listed on the home page.
    #[serde(default = "defaults::site::home_posts")]
    #[educe(Default = defaults::site::home_posts())]
    pub home_posts: usize,

    /// Number of posts included in `/feed.xml`.
    #[serde(default = "defaults::site::feed_items")]
    #[educe(Default = defaults::site::feed_items())]
    pub feed_items: usize,
}
