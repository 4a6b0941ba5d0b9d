//! HTML templates.

use super::Chrome;
use crate::content::ContentEntity;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::sync::Arc;

// ============================================================================
// Page Renderers
// ============================================================================

pub fn home(chrome: &Chrome<'_>, posts: &[Arc<ContentEntity>]) -> Markup {
    let site = chrome.site;
    let content = html! {
        section.intro {
            h1 { (site.title) }
            @if !site.description.is_empty() {
                p.lead { (site.description) }
            }
        }
        section.recent {
            h2 { "Recent posts" }
            (post_list(posts))
            p.more { a href="/posts" { "All posts →" } }
        }
    };
    base_document(chrome, &site.title, Some(&site.description), content)
}

pub fn listing(chrome: &Chrome<'_>, posts: &[Arc<ContentEntity>]) -> Markup {
    let content = html! {
        h1 { "All posts" }
        (post_list(posts))
    };
    base_document(chrome, &page_title(chrome, "Posts"), None, content)
}

pub fn tag_listing(chrome: &Chrome<'_>, tag: &str, posts: &[Arc<ContentEntity>]) -> Markup {
    let content = html! {
        h1 { "Posts tagged " span.tag { "#" (tag) } }
        (post_list(posts))
        p.more { a href="/posts" { "All posts →" } }
    };
    base_document(chrome, &page_title(chrome, &format!("#{tag}")), None, content)
}

pub fn post(chrome: &Chrome<'_>, post: &ContentEntity) -> Markup {
    let content = html! {
        article.post {
            header {
                h1 { (post.title) }
                @if let Some(date) = post.date {
                    time datetime=(post.date_string()) { (date.format("%B %-d, %Y").to_string()) }
                }
                (tag_links(&post.tags))
            }
            div.content { (PreEscaped(&post.html)) }
        }
    };
    base_document(chrome, &page_title(chrome, &post.title), Some(&post.description), content)
}

pub fn page(chrome: &Chrome<'_>, page: &ContentEntity) -> Markup {
    let content = html! {
        article.page {
            h1 { (page.title) }
            div.content { (PreEscaped(&page.html)) }
        }
    };
    base_document(chrome, &page_title(chrome, &page.title), Some(&page.description), content)
}

// ============================================================================
// HTML Components
// ============================================================================

fn page_title(chrome: &Chrome<'_>, title: &str) -> String {
    format!("{title} | {}", chrome.site.title)
}

/// Renders the base HTML document structure
fn base_document(
    chrome: &Chrome<'_>,
    title: &str,
    description: Option<&str>,
    content: Markup,
) -> Markup {
    let site = chrome.site;
    let description = description.filter(|d| !d.is_empty());

    html! {
        (DOCTYPE)
        html lang=(site.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(description) = description {
                    meta name="description" content=(description);
                }
                link rel="alternate" type="application/rss+xml" title=(site.title) href="/feed.xml";
                link rel="stylesheet" href="/static/css/style.css";
            }
            body {
                @if chrome.debug {
                    div.debug-banner { "debug mode: cache disabled" }
                }
                header.site-header {
                    a.site-title href="/" { (site.title) }
                    nav.site-nav {
                        a href="/posts" { "Posts" }
                        a href="/feed.xml" { "RSS" }
                    }
                }
                main { (content) }
                footer.site-footer {
                    "© " (site.author) " · sheaf " (chrome.version)
                }
            }
        }
    }
}

fn post_list(posts: &[Arc<ContentEntity>]) -> Markup {
    html! {
        @if posts.is_empty() {
            p.empty { "Nothing here yet." }
        } @else {
            ul.post-list {
                @for post in posts {
                    li {
                        @if post.date.is_some() {
                            @let ymd = post.date_string();
                            time datetime=(ymd) { (ymd) }
                        }
                        a href=(post.route()) { (post.title) }
                        @if !post.description.is_empty() {
                            p.summary { (post.description) }
                        }
                    }
                }
            }
        }
    }
}

fn tag_links(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li { a href={ "/tag/" (urlencoding::encode(tag).into_owned()) } { "#" (tag) } }
                }
            }
        }
    }
}
