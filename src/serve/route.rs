//! Request routing.

/// A recognised request path.
///
/// Parsed from the canonical route (see [`crate::snapshot::canonical_route`]),
/// so paths never carry a query string or a trailing slash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    Posts,
    Post(&'a str),
    Tag(&'a str),
    Feed,
    Healthz,
    AdminRefresh,
    /// Path below `/static/`.
    Static(&'a str),
    Page(&'a str),
}

impl<'a> Route<'a> {
    /// Match `path` against the route table. `None` means 404.
    pub fn parse(path: &'a str) -> Option<Self> {
        let rest = path.strip_prefix('/')?;

        if let Some(file) = rest.strip_prefix("static/") {
            return (!file.is_empty()).then_some(Self::Static(file));
        }

        let mut segments = rest.split('/');
        let route = match (segments.next()?, segments.next(), segments.next()) {
            ("", None, None) => Self::Home,
            ("posts", None, None) => Self::Posts,
            ("feed.xml", None, None) => Self::Feed,
            ("healthz", None, None) => Self::Healthz,
            ("admin", Some("refresh"), None) => Self::AdminRefresh,
            ("blog", Some(slug), None) if !slug.is_empty() => Self::Post(slug),
            ("tag", Some(tag), None) if !tag.is_empty() => Self::Tag(tag),
            (page, None, None) => Self::Page(page),
            _ => return None,
        };
        Some(route)
    }

    /// Whether responses for this route go through the page cache.
    pub const fn is_cached(self) -> bool {
        matches!(
            self,
            Self::Home | Self::Posts | Self::Post(_) | Self::Tag(_) | Self::Feed | Self::Page(_)
        )
    }

    /// Only `POST /admin/refresh` is not a plain read.
    pub const fn allowed_method(self) -> &'static str {
        match self {
            Self::AdminRefresh => "POST",
            _ => "GET, HEAD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/posts"), Some(Route::Posts));
        assert_eq!(Route::parse("/blog/hello"), Some(Route::Post("hello")));
        assert_eq!(Route::parse("/tag/rust"), Some(Route::Tag("rust")));
        assert_eq!(Route::parse("/feed.xml"), Some(Route::Feed));
        assert_eq!(Route::parse("/healthz"), Some(Route::Healthz));
        assert_eq!(Route::parse("/admin/refresh"), Some(Route::AdminRefresh));
        assert_eq!(Route::parse("/static/css/style.css"), Some(Route::Static("css/style.css")));
        assert_eq!(Route::parse("/about"), Some(Route::Page("about")));
    }

    #[test]
    fn test_unmatched_paths() {
        assert_eq!(Route::parse("/blog/a/b"), None);
        assert_eq!(Route::parse("/about/team"), None);
        assert_eq!(Route::parse("/admin/other"), None);
        assert_eq!(Route::parse("/static/"), None);
        assert_eq!(Route::parse("no-slash"), None);
    }

    #[test]
    fn test_bare_prefixes_fall_through_to_pages() {
        // like `/{page}` in the route table, `/blog` alone names a page
        assert_eq!(Route::parse("/blog"), Some(Route::Page("blog")));
        assert_eq!(Route::parse("/admin"), Some(Route::Page("admin")));
    }

    #[test]
    fn test_cache_and_methods() {
        assert!(Route::Post("x").is_cached());
        assert!(!Route::AdminRefresh.is_cached());
        assert!(!Route::Static("a.css").is_cached());
        assert_eq!(Route::AdminRefresh.allowed_method(), "POST");
        assert_eq!(Route::Home.allowed_method(), "GET, HEAD");
    }
}
