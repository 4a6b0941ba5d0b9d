//! RSS 2.0 feed for `/feed.xml`.

use crate::{config::SiteSection, content::ContentEntity, render::RenderError};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};
use std::sync::Arc;

/// Build the feed XML for the newest `site.feed_items` of `posts`.
///
/// `base_url` is the absolute site origin links are built from, e.g.
/// `https://example.com`.
pub fn build(
    site: &SiteSection,
    posts: &[Arc<ContentEntity>],
    base_url: &str,
) -> Result<String, RenderError> {
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(RenderError::InvalidBaseUrl(base_url.to_owned()));
    }
    let base_url = base_url.trim_end_matches('/');

    let items: Vec<_> = posts
        .iter()
        .take(site.feed_items)
        .map(|post| post_to_item(post, base_url))
        .collect();

    let description = if site.description.is_empty() {
        &site.title
    } else {
        &site.description
    };

    let channel = ChannelBuilder::default()
        .title(&site.title)
        .link(format!("{base_url}/"))
        .description(description)
        .language(Some(site.language.clone()))
        .generator(Some(format!("sheaf {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| RenderError::Feed(e.to_string()))?;
    Ok(channel.to_string())
}

fn post_to_item(post: &ContentEntity, base_url: &str) -> rss::Item {
    let link = format!("{base_url}{}", post.route());
    let pub_date = post
        .date
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().to_rfc2822());
    let description = (!post.description.is_empty()).then(|| post.description.clone());

    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(description)
        .pub_date(pub_date)
        .categories(
            post.tags
                .iter()
                .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                .collect::<Vec<_>>(),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::sample_index;

    fn site(feed_items: usize) -> SiteSection {
        let mut site = SiteSection::default();
        site.title = "Field Notes".into();
        site.feed_items = feed_items;
        site
    }

    #[test]
    fn test_feed_items_and_links() {
        let index = sample_index();
        let xml = build(&site(20), index.all_posts(), "https://example.com/").unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.title(), "Field Notes");
        assert_eq!(channel.link(), "https://example.com/");
        // site description is empty, title stands in
        assert_eq!(channel.description(), "Field Notes");

        let links: Vec<_> = channel.items().iter().filter_map(|i| i.link()).collect();
        assert_eq!(
            links,
            [
                "https://example.com/blog/newest",
                "https://example.com/blog/middle",
                "https://example.com/blog/oldest"
            ]
        );
        let first = &channel.items()[0];
        assert!(first.pub_date().unwrap().contains("Mar 2024"));
        assert_eq!(first.categories().len(), 2);
    }

    #[test]
    fn test_feed_respects_item_limit() {
        let index = sample_index();
        let xml = build(&site(1), index.all_posts(), "http://localhost:8080").unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.items().len(), 1);
        assert_eq!(channel.items()[0].title(), Some("NEWEST"));
    }

    #[test]
    fn test_feed_rejects_relative_base() {
        let index = sample_index();
        let err = build(&site(20), index.all_posts(), "example.com").unwrap_err();
        assert!(matches!(err, RenderError::InvalidBaseUrl(_)));
    }
}
