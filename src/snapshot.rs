//! Generations of published content and the refresh that replaces them.
//!
//! A [`Generation`] pairs one [`ContentIndex`] with the [`PageCache`] filled
//! from it. The pair is swapped as a unit, so a rendered page can only ever
//! land in the cache of the generation it was rendered from:
//!
//! ```text
//!   request ──snapshot()──▶ Arc<Generation G1> ──serve_cached()──▶ G1.cache
//!                                 ▲
//!   refresh ──load──index──publish(G2)   (G1 lives on until its last reader drops it)
//! ```

use crate::{
    cache::PageCache,
    config::SiteConfig,
    content::{CollectionKind, ContentError, ContentLoader, LoadOutcome},
    debug,
    hook::RefreshHook,
    index::ContentIndex,
    log,
    render::RenderError,
};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// A refresh that did not publish anything.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to load {}", kind.plural())]
    Load {
        kind: CollectionKind,
        #[source]
        source: ContentError,
    },
}

// ============================================================================
// Generation
// ============================================================================

/// One published content set and its render cache.
#[derive(Debug)]
pub struct Generation {
    id: u64,
    built_at: DateTime<Utc>,
    index: ContentIndex,
    pages: PageCache,
}

/// Outcome of [`Generation::serve_cached`].
#[derive(Debug, Clone)]
pub enum Served {
    /// Found in this generation's cache.
    Hit(Arc<[u8]>),
    /// Rendered now (and cached unless bypassed).
    Rendered(Arc<[u8]>),
    NotFound,
}

impl Served {
    pub fn bytes(&self) -> Option<&Arc<[u8]>> {
        match self {
            Self::Hit(bytes) | Self::Rendered(bytes) => Some(bytes),
            Self::NotFound => None,
        }
    }
}

impl Generation {
    fn new(id: u64, index: ContentIndex, pages: PageCache) -> Self {
        Self {
            id,
            built_at: Utc::now(),
            index,
            pages,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    pub fn cache(&self) -> &PageCache {
        &self.pages
    }

    /// Serve `key` from this generation, rendering and caching on a miss.
    ///
    /// `resolve` sees only this generation's index and returns `Ok(None)` for
    /// an unknown route. With `bypass` the cache is neither read nor written.
    /// Nothing is cached for `NotFound` or on error.
    pub fn serve_cached<F>(
        &self,
        key: &str,
        bypass: bool,
        resolve: F,
    ) -> Result<Served, RenderError>
    where
        F: FnOnce(&ContentIndex) -> Result<Option<Vec<u8>>, RenderError>,
    {
        if !bypass && let Some(bytes) = self.pages.get(key) {
            debug!("cache"; "hit {key} (generation {})", self.id);
            return Ok(Served::Hit(bytes));
        }

        let start = Instant::now();
        let Some(bytes) = resolve(&self.index)? else {
            return Ok(Served::NotFound);
        };
        let bytes: Arc<[u8]> = bytes.into();

        if !bypass {
            self.pages.set(key, Arc::clone(&bytes));
        }
        log!("render"; "{key} in {:.2?} (generation {})", start.elapsed(), self.id);

        Ok(Served::Rendered(bytes))
    }
}

/// Cache key for a request target.
///
/// Drops the query string and fragment, percent-decodes, and removes trailing
/// slashes except on `/` itself.
pub fn canonical_route(target: &str) -> String {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
    let trimmed = decoded.trim_end_matches('/');

    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

// ============================================================================
// Content Sources
// ============================================================================

/// Where content is loaded from.
#[derive(Debug, Clone)]
pub struct ContentSources {
    loader: ContentLoader,
    posts: PathBuf,
    pages: PathBuf,
}

/// Both collections of one successful load.
#[derive(Debug)]
pub struct LoadedContent {
    pub posts: LoadOutcome,
    pub pages: LoadOutcome,
}

impl LoadedContent {
    pub fn skipped(&self) -> usize {
        self.posts.skipped.len() + self.pages.skipped.len()
    }

    pub fn drafts(&self) -> usize {
        self.posts.drafts + self.pages.drafts
    }
}

impl ContentSources {
    pub fn new(loader: ContentLoader, posts: &Path, pages: &Path) -> Self {
        Self {
            loader,
            posts: posts.to_path_buf(),
            pages: pages.to_path_buf(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, ContentError> {
        let loader = ContentLoader::new(&config.content.pattern, &config.content.highlight_theme)?;
        Ok(Self::new(loader, &config.content.posts, &config.content.pages))
    }

    pub fn dirs(&self) -> [&Path; 2] {
        [&self.posts, &self.pages]
    }

    /// Load posts and pages in parallel. Either failing fails the whole load.
    pub fn load(&self) -> Result<LoadedContent, RefreshError> {
        let (posts, pages) = rayon::join(
            || self.loader.load(&self.posts, CollectionKind::Post),
            || self.loader.load(&self.pages, CollectionKind::Page),
        );

        let posts = posts.map_err(|source| RefreshError::Load {
            kind: CollectionKind::Post,
            source,
        })?;
        let pages = pages.map_err(|source| RefreshError::Load {
            kind: CollectionKind::Page,
            source,
        })?;
        Ok(LoadedContent { posts, pages })
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Summary of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub generation: u64,
    pub posts: usize,
    pub pages: usize,
    pub skipped: usize,
    pub drafts: usize,
    pub elapsed: Duration,
}

/// Owns the published generation and serializes refreshes.
#[derive(Debug)]
pub struct SnapshotCoordinator {
    current: ArcSwap<Generation>,
    sources: ContentSources,
    hook: Option<RefreshHook>,
    refresh_lock: Mutex<()>,
    next_id: AtomicU64,
}

impl SnapshotCoordinator {
    /// Perform the initial load and publish generation 1.
    pub fn bootstrap(
        sources: ContentSources,
        hook: Option<RefreshHook>,
    ) -> Result<Self, RefreshError> {
        let loaded = sources.load()?;
        let index = ContentIndex::build(loaded.posts.entities, loaded.pages.entities);
        let first = Generation::new(1, index, PageCache::new());

        log!(
            "refresh";
            "generation 1: {} posts, {} pages",
            first.index.post_count(),
            first.index.page_count()
        );

        Ok(Self {
            current: ArcSwap::from_pointee(first),
            sources,
            hook,
            refresh_lock: Mutex::new(()),
            next_id: AtomicU64::new(2),
        })
    }

    /// The current generation. Callers keep the returned `Arc` for the whole
    /// request.
    pub fn snapshot(&self) -> Arc<Generation> {
        self.current.load_full()
    }

    /// Atomically replace the current generation.
    pub fn publish(&self, index: ContentIndex, pages: PageCache) -> Arc<Generation> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let generation = Arc::new(Generation::new(id, index, pages));
        self.current.store(Arc::clone(&generation));
        generation
    }

    pub fn sources(&self) -> &ContentSources {
        &self.sources
    }

    /// Reload all content and publish it as a new generation.
    ///
    /// Concurrent calls run one after another. On error the current
    /// generation stays published and the hook does not run.
    pub fn refresh(&self) -> Result<RefreshReport, RefreshError> {
        let _guard = self.refresh_lock.lock();
        let start = Instant::now();

        let loaded = self.sources.load()?;
        let (skipped, drafts) = (loaded.skipped(), loaded.drafts());
        let index = ContentIndex::build(loaded.posts.entities, loaded.pages.entities);
        let generation = self.publish(index, PageCache::new());

        let report = RefreshReport {
            generation: generation.id,
            posts: generation.index.post_count(),
            pages: generation.index.page_count(),
            skipped,
            drafts,
            elapsed: start.elapsed(),
        };
        log!(
            "refresh";
            "generation {}: {} posts, {} pages in {:.2?}",
            report.generation,
            report.posts,
            report.pages,
            report.elapsed
        );

        self.run_hook();
        Ok(report)
    }

    /// Fire the post-refresh hook, if one is configured.
    pub fn run_hook(&self) {
        if let Some(hook) = &self.hook {
            hook.fire();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::sample_index;
    use std::{
        fs,
        sync::{Barrier, atomic::AtomicUsize},
        thread,
    };
    use tempfile::TempDir;

    struct Site {
        _dir: TempDir,
        posts: PathBuf,
        pages: PathBuf,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let posts = dir.path().join("posts");
            let pages = dir.path().join("pages");
            fs::create_dir_all(&posts).unwrap();
            fs::create_dir_all(&pages).unwrap();
            fs::write(pages.join("about.md"), "---\ntitle: About\n---\nhi\n").unwrap();
            Self {
                _dir: dir,
                posts,
                pages,
            }
        }

        fn post(&self, name: &str, date: &str) {
            let body = format!("---\ntitle: {name}\ndate: \"{date}\"\n---\nbody\n");
            fs::write(self.posts.join(name), body).unwrap();
        }

        fn coordinator(&self) -> Result<SnapshotCoordinator, RefreshError> {
            let loader = ContentLoader::new("*.md", "InspiredGitHub").unwrap();
            let sources = ContentSources::new(loader, &self.posts, &self.pages);
            SnapshotCoordinator::bootstrap(sources, None)
        }
    }

    fn render_count(counter: &AtomicUsize) -> Result<Option<Vec<u8>>, RenderError> {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(Some(format!("render {n}").into_bytes()))
    }

    #[test]
    fn test_canonical_route() {
        assert_eq!(canonical_route("/"), "/");
        assert_eq!(canonical_route(""), "/");
        assert_eq!(canonical_route("/posts/"), "/posts");
        assert_eq!(canonical_route("/posts?page=2"), "/posts");
        assert_eq!(canonical_route("/blog/hello#top"), "/blog/hello");
        assert_eq!(canonical_route("/tag/rust%20lang"), "/tag/rust lang");
        assert_eq!(canonical_route("//"), "/");
        assert_eq!(canonical_route("about"), "/about");
    }

    #[test]
    fn test_serve_cached_hit_after_render() {
        let generation = Generation::new(1, sample_index(), PageCache::new());
        let counter = AtomicUsize::new(0);

        let first = generation.serve_cached("/", false, |_| render_count(&counter)).unwrap();
        let second = generation.serve_cached("/", false, |_| render_count(&counter)).unwrap();

        assert!(matches!(first, Served::Rendered(_)));
        assert!(matches!(second, Served::Hit(_)));
        assert_eq!(first.bytes(), second.bytes());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_serve_cached_bypass() {
        let generation = Generation::new(1, sample_index(), PageCache::new());
        let counter = AtomicUsize::new(0);

        generation.serve_cached("/", true, |_| render_count(&counter)).unwrap();
        generation.serve_cached("/", true, |_| render_count(&counter)).unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(generation.cache().len(), 0);
    }

    #[test]
    fn test_not_found_and_errors_are_not_cached() {
        let generation = Generation::new(1, sample_index(), PageCache::new());

        let served = generation
            .serve_cached("/blog/missing", false, |index| {
                Ok(index.post("missing").map(|_| Vec::new()))
            })
            .unwrap();
        assert!(matches!(served, Served::NotFound));

        let err = generation
            .serve_cached("/feed.xml", false, |_| Err(RenderError::Feed("bad".into())))
            .unwrap_err();
        assert_eq!(err.code(), "SHF-FEED-VAL");
        assert_eq!(generation.cache().len(), 0);
    }

    #[test]
    fn test_render_lands_in_captured_generation() {
        let site = Site::new();
        site.post("2024-01-01-hello.md", "2024-01-01");
        let coordinator = site.coordinator().unwrap();

        let g1 = coordinator.snapshot();
        let served = g1
            .serve_cached("/blog/hello", false, |index| {
                // a refresh publishes while this request is rendering
                coordinator.publish(ContentIndex::default(), PageCache::new());
                Ok(index.post("hello").map(|p| p.title.clone().into_bytes()))
            })
            .unwrap();

        assert!(matches!(served, Served::Rendered(_)));
        let g2 = coordinator.snapshot();
        assert_eq!(g2.id(), g1.id() + 1);
        assert!(g1.cache().get("/blog/hello").is_some());
        assert!(g2.cache().get("/blog/hello").is_none());
    }

    #[test]
    fn test_publish_during_concurrent_request() {
        let site = Site::new();
        site.post("2024-01-01-hello.md", "2024-01-01");
        let coordinator = site.coordinator().unwrap();
        let captured = Barrier::new(2);
        let published = Barrier::new(2);

        thread::scope(|s| {
            s.spawn(|| {
                let generation = coordinator.snapshot();
                captured.wait();
                published.wait();
                generation
                    .serve_cached("/", false, |index| {
                        Ok(Some(format!("{} posts", index.post_count()).into_bytes()))
                    })
                    .unwrap();
                assert_eq!(&*generation.cache().get("/").unwrap(), b"1 posts");
            });

            captured.wait();
            coordinator.publish(ContentIndex::default(), PageCache::new());
            published.wait();
        });

        assert_eq!(coordinator.snapshot().cache().len(), 0);
    }

    #[test]
    fn test_refresh_publishes_new_content() {
        let site = Site::new();
        site.post("2024-01-01-hello.md", "2024-01-01");
        let coordinator = site.coordinator().unwrap();
        assert_eq!(coordinator.snapshot().id(), 1);

        site.post("2024-02-01-world.md", "2024-02-01");
        let report = coordinator.refresh().unwrap();

        assert_eq!(report.generation, 2);
        assert_eq!(report.posts, 2);
        assert_eq!(report.pages, 1);
        let current = coordinator.snapshot();
        let slugs: Vec<_> = current.index().all_posts().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["world", "hello"]);
    }

    #[test]
    fn test_refresh_skips_invalid_date() {
        let site = Site::new();
        site.post("2024-01-01-a.md", "2024-01-01");
        let coordinator = site.coordinator().unwrap();

        site.post("2024-01-02-b.md", "2024-01-02");
        site.post("2024-01-03-c.md", "2024-13-03");
        let report = coordinator.refresh().unwrap();

        assert_eq!(report.posts, 2);
        assert_eq!(report.skipped, 1);
        assert!(coordinator.snapshot().index().post("c").is_none());
    }

    #[test]
    fn test_failed_refresh_keeps_generation() {
        let site = Site::new();
        site.post("2024-01-01-a.md", "2024-01-01");
        let coordinator = site.coordinator().unwrap();
        let before = coordinator.snapshot();
        before.cache().set("/", Arc::from(&b"warm"[..]));

        // the only post becomes unusable
        site.post("2024-01-01-a.md", "not-a-date");
        let err = coordinator.refresh().unwrap_err();

        assert!(matches!(
            err,
            RefreshError::Load {
                kind: CollectionKind::Post,
                source: ContentError::NoUsableContent { .. }
            }
        ));
        let after = coordinator.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(&*after.cache().get("/").unwrap(), b"warm");
    }

    #[test]
    fn test_bootstrap_fails_without_content() {
        let site = Site::new();
        let err = site.coordinator().unwrap_err();
        assert!(matches!(
            err,
            RefreshError::Load {
                source: ContentError::NoContentFound { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_concurrent_refreshes_are_serialized() {
        let site = Site::new();
        site.post("2024-01-01-a.md", "2024-01-01");
        let coordinator = site.coordinator().unwrap();

        let mut ids: Vec<u64> = thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| coordinator.refresh().unwrap().generation))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        ids.sort_unstable();

        assert_eq!(ids, [2, 3, 4, 5]);
        assert_eq!(coordinator.snapshot().id(), 5);
    }
}
