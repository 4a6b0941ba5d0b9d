//! Immutable lookup structures over one loaded content set.

use crate::{content::ContentEntity, warn};
use rustc_hash::FxHashMap;
use std::{collections::BTreeMap, sync::Arc};

/// By-slug and by-tag lookups for one generation of content.
///
/// Built once and never mutated, so any number of requests can read it
/// without coordination.
#[derive(Debug, Default)]
pub struct ContentIndex {
    posts: FxHashMap<String, Arc<ContentEntity>>,
    pages: FxHashMap<String, Arc<ContentEntity>>,
    /// Each list inherits the date-descending order of `all_posts`.
    tags: BTreeMap<String, Vec<Arc<ContentEntity>>>,
    all_posts: Vec<Arc<ContentEntity>>,
}

impl ContentIndex {
    /// Build an index from posts (already sorted newest first) and pages.
    ///
    /// Duplicate slugs resolve to the last entity in input order; every
    /// post still appears in `all_posts` and its tag lists.
    pub fn build(posts: Vec<ContentEntity>, pages: Vec<ContentEntity>) -> Self {
        let mut index = Self {
            posts: FxHashMap::default(),
            pages: FxHashMap::default(),
            tags: BTreeMap::new(),
            all_posts: Vec::with_capacity(posts.len()),
        };

        for post in posts {
            let post = Arc::new(post);
            for tag in &post.tags {
                index
                    .tags
                    .entry(tag.clone())
                    .or_default()
                    .push(Arc::clone(&post));
            }
            let replaced = index.posts.insert(post.slug.clone(), Arc::clone(&post));
            warn_duplicate(replaced.as_deref(), &post);
            index.all_posts.push(post);
        }

        for page in pages {
            let page = Arc::new(page);
            let replaced = index.pages.insert(page.slug.clone(), Arc::clone(&page));
            warn_duplicate(replaced.as_deref(), &page);
        }

        index
    }

    pub fn post(&self, slug: &str) -> Option<&Arc<ContentEntity>> {
        self.posts.get(slug)
    }

    pub fn page(&self, slug: &str) -> Option<&Arc<ContentEntity>> {
        self.pages.get(slug)
    }

    /// Posts carrying `tag`, newest first. `None` for a tag no post uses.
    pub fn posts_by_tag(&self, tag: &str) -> Option<&[Arc<ContentEntity>]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    /// All posts, newest first.
    pub fn all_posts(&self) -> &[Arc<ContentEntity>] {
        &self.all_posts
    }

    /// Every tag in use, in lexical order.
    pub fn all_tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn tag_counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tags.iter().map(|(tag, posts)| (tag.as_str(), posts.len()))
    }

    pub fn post_count(&self) -> usize {
        self.all_posts.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn warn_duplicate(replaced: Option<&ContentEntity>, by: &ContentEntity) {
    if let Some(old) = replaced {
        warn!(
            "content";
            "duplicate {} slug `{}`: {} shadows {}",
            by.kind,
            by.slug,
            by.source.display(),
            old.source.display()
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::CollectionKind;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    pub(crate) fn entity(
        kind: CollectionKind,
        slug: &str,
        date: &str,
        tags: &[&str],
    ) -> ContentEntity {
        ContentEntity {
            slug: slug.into(),
            title: slug.to_uppercase(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: format!("about {slug}"),
            html: format!("<p>{slug}</p>"),
            kind,
            source: PathBuf::from(format!("{slug}.md")),
        }
    }

    pub(crate) fn sample_index() -> ContentIndex {
        ContentIndex::build(
            vec![
                entity(CollectionKind::Post, "newest", "2024-03-01", &["rust", "web"]),
                entity(CollectionKind::Post, "middle", "2024-02-01", &["web"]),
                entity(CollectionKind::Post, "oldest", "2024-01-01", &["rust"]),
            ],
            vec![entity(CollectionKind::Page, "about", "", &[])],
        )
    }

    fn slugs(posts: &[Arc<ContentEntity>]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn test_lookup_by_slug() {
        let index = sample_index();
        assert_eq!(index.post("middle").unwrap().title, "MIDDLE");
        assert_eq!(index.page("about").unwrap().kind, CollectionKind::Page);
        assert!(index.post("about").is_none());
        assert!(index.page("middle").is_none());
        assert!(index.post("missing").is_none());
    }

    #[test]
    fn test_tag_lists_keep_post_order() {
        let index = sample_index();
        assert_eq!(slugs(index.posts_by_tag("rust").unwrap()), ["newest", "oldest"]);
        assert_eq!(slugs(index.posts_by_tag("web").unwrap()), ["newest", "middle"]);
        assert!(index.posts_by_tag("go").is_none());
    }

    #[test]
    fn test_all_tags_lexical() {
        let index = sample_index();
        assert_eq!(index.all_tags().collect::<Vec<_>>(), ["rust", "web"]);
        assert_eq!(
            index.tag_counts().collect::<Vec<_>>(),
            [("rust", 2), ("web", 2)]
        );
    }

    #[test]
    fn test_counts() {
        let index = sample_index();
        assert_eq!(index.post_count(), 3);
        assert_eq!(index.page_count(), 1);
        assert_eq!(slugs(index.all_posts()), ["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_duplicate_slug_last_wins() {
        let mut second = entity(CollectionKind::Post, "dup", "2024-01-01", &[]);
        second.title = "Second".into();
        let index = ContentIndex::build(
            vec![entity(CollectionKind::Post, "dup", "2024-02-01", &[]), second],
            vec![],
        );
        assert_eq!(index.post("dup").unwrap().title, "Second");
        assert_eq!(index.post_count(), 2);
    }

    #[test]
    fn test_empty_index() {
        let index = ContentIndex::default();
        assert!(index.all_posts().is_empty());
        assert_eq!(index.all_tags().count(), 0);
    }
}
