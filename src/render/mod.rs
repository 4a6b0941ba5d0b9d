//! Page rendering.
//!
//! Every dynamic route resolves to one [`PageView`], which [`Renderer`]
//! turns into the exact bytes stored in the page cache.
//!
//! | View          | Route          | Output       |
//! |---------------|----------------|--------------|
//! | `Home`        | `/`            | HTML         |
//! | `Listing`     | `/posts`       | HTML         |
//! | `TagListing`  | `/tag/{tag}`   | HTML         |
//! | `Post`        | `/blog/{slug}` | HTML         |
//! | `Page`        | `/{slug}`      | HTML         |
//! | `Feed`        | `/feed.xml`    | RSS 2.0 XML  |

mod error;
mod minify;
mod views;

pub use error::RenderError;

use crate::{config::SiteConfig, config::SiteSection, content::ContentEntity, feed};
use minify::minify;
use std::sync::Arc;

/// Data for one rendered response.
#[derive(Debug, Clone, Copy)]
pub enum PageView<'a> {
    Home { posts: &'a [Arc<ContentEntity>] },
    Listing { posts: &'a [Arc<ContentEntity>] },
    TagListing { tag: &'a str, posts: &'a [Arc<ContentEntity>] },
    Post(&'a ContentEntity),
    Page(&'a ContentEntity),
    Feed { posts: &'a [Arc<ContentEntity>], base_url: &'a str },
}

/// Values shared by every template.
pub(crate) struct Chrome<'a> {
    pub site: &'a SiteSection,
    pub debug: bool,
    pub version: &'static str,
}

/// Renders [`PageView`]s with the site's metadata.
#[derive(Debug, Clone)]
pub struct Renderer {
    site: SiteSection,
    minify: bool,
    debug: bool,
}

impl Renderer {
    pub fn new(site: SiteSection, minify: bool, debug: bool) -> Self {
        Self { site, minify, debug }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.site.clone(), config.serve.minify, config.serve.debug)
    }

    pub fn site(&self) -> &SiteSection {
        &self.site
    }

    /// Render `view` to response bytes.
    pub fn render(&self, view: &PageView<'_>) -> Result<Vec<u8>, RenderError> {
        let chrome = Chrome {
            site: &self.site,
            debug: self.debug,
            version: env!("CARGO_PKG_VERSION"),
        };

        let markup = match *view {
            PageView::Home { posts } => views::home(&chrome, posts),
            PageView::Listing { posts } => views::listing(&chrome, posts),
            PageView::TagListing { tag, posts } => views::tag_listing(&chrome, tag, posts),
            PageView::Post(post) => views::post(&chrome, post),
            PageView::Page(page) => views::page(&chrome, page),
            PageView::Feed { posts, base_url } => {
                return Ok(feed::build(&self.site, posts, base_url)?.into_bytes());
            }
        };

        let html = markup.into_string();
        Ok(minify(html.as_bytes(), self.minify).into_owned())
    }
}
