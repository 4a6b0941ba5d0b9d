//! Request handling, independent of the HTTP transport.
//!
//! [`handle`] maps one [`Incoming`] request to a [`Reply`]. Every dynamic
//! route goes through [`Generation::serve_cached`] on a single snapshot.

use super::{
    admin::{AdminAuth, AuthOutcome},
    files::read_static,
    route::Route,
};
use crate::{
    config::SiteConfig,
    index::ContentIndex,
    logger::error_chain,
    render::{PageView, RenderError, Renderer},
    snapshot::{Generation, RefreshError, SnapshotCoordinator, canonical_route},
    warn,
};
use std::{path::PathBuf, sync::Arc};

/// Shared state for all request workers.
pub struct ServerContext {
    pub coordinator: Arc<SnapshotCoordinator>,
    pub renderer: Renderer,
    pub auth: AdminAuth,
    pub static_dir: PathBuf,
    /// Debug mode: render every request fresh.
    pub bypass_cache: bool,
}

impl ServerContext {
    pub fn new(config: &SiteConfig, coordinator: Arc<SnapshotCoordinator>) -> Self {
        Self {
            coordinator,
            renderer: Renderer::from_config(config),
            auth: AdminAuth::from_config(config),
            static_dir: config.serve.static_dir.clone(),
            bypass_cache: config.serve.debug,
        }
    }
}

/// HTTP method, reduced to what the router distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Other,
}

/// The parts of a request the handler looks at.
#[derive(Debug, Clone, Copy)]
pub struct Incoming<'a> {
    pub method: Method,
    /// Request target, e.g. `/posts?page=2`.
    pub url: &'a str,
    pub authorization: Option<&'a str>,
    pub host: Option<&'a str>,
    pub forwarded_proto: Option<&'a str>,
}

/// A complete response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Arc<[u8]>,
    /// Value of the `Allow` header on 405 responses.
    pub allow: Option<&'static str>,
}

impl Reply {
    fn new(status: u16, content_type: &'static str, body: impl Into<Arc<[u8]>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            allow: None,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.as_bytes())
    }

    fn not_found() -> Self {
        Self::text(404, "404 Not Found")
    }

    fn method_not_allowed(allow: &'static str) -> Self {
        Self {
            allow: Some(allow),
            ..Self::text(405, "405 Method Not Allowed")
        }
    }

    /// Opaque 500; details belong in the log only.
    fn internal_error(code: &str) -> Self {
        Self::text(500, &format!("Internal Error. Code: {code}"))
    }
}

/// Handle one request.
pub fn handle(ctx: &ServerContext, req: &Incoming<'_>) -> Reply {
    let key = canonical_route(req.url);
    let Some(route) = Route::parse(&key) else {
        return Reply::not_found();
    };

    let method_ok = match route {
        Route::AdminRefresh => req.method == Method::Post,
        _ => matches!(req.method, Method::Get | Method::Head),
    };
    if !method_ok {
        return Reply::method_not_allowed(route.allowed_method());
    }

    match route {
        Route::AdminRefresh => admin_refresh(ctx, req),
        Route::Healthz => healthz(&ctx.coordinator.snapshot()),
        Route::Static(file) => match read_static(&ctx.static_dir, file) {
            Some((content, content_type)) => Reply::new(200, content_type, content),
            None => Reply::not_found(),
        },
        route if route.is_cached() => serve_dynamic(ctx, req, route, &key),
        _ => Reply::not_found(),
    }
}

// ============================================================================
// Dynamic Routes
// ============================================================================

fn serve_dynamic(ctx: &ServerContext, req: &Incoming<'_>, route: Route<'_>, key: &str) -> Reply {
    let site = ctx.renderer.site();
    let base_url = site
        .url
        .clone()
        .unwrap_or_else(|| request_base_url(req));
    // a Host-derived feed must not be served to other hosts
    let bypass = ctx.bypass_cache || (route == Route::Feed && site.url.is_none());

    // one snapshot for the whole request
    let generation: Arc<Generation> = ctx.coordinator.snapshot();
    let result = generation.serve_cached(key, bypass, |index| {
        let Some(view) = resolve_view(route, index, site.home_posts, &base_url) else {
            return Ok(None);
        };
        ctx.renderer.render(&view).map(Some)
    });

    match result {
        Ok(served) => match served.bytes() {
            Some(body) => Reply::new(200, content_type(route), Arc::clone(body)),
            None => Reply::not_found(),
        },
        Err(err) => render_failure(key, &err),
    }
}

/// Look up the data for `route` in one generation's index.
fn resolve_view<'a>(
    route: Route<'a>,
    index: &'a ContentIndex,
    home_posts: usize,
    base_url: &'a str,
) -> Option<PageView<'a>> {
    let view = match route {
        Route::Home => {
            let posts = index.all_posts();
            PageView::Home {
                posts: &posts[..posts.len().min(home_posts)],
            }
        }
        Route::Posts => PageView::Listing {
            posts: index.all_posts(),
        },
        Route::Post(slug) => PageView::Post(index.post(slug)?),
        Route::Page(slug) => PageView::Page(index.page(slug)?),
        Route::Tag(tag) => PageView::TagListing {
            tag,
            posts: index.posts_by_tag(tag)?,
        },
        Route::Feed => PageView::Feed {
            posts: index.all_posts(),
            base_url,
        },
        Route::Healthz | Route::AdminRefresh | Route::Static(_) => return None,
    };
    Some(view)
}

fn content_type(route: Route<'_>) -> &'static str {
    match route {
        Route::Feed => "application/rss+xml; charset=utf-8",
        _ => "text/html; charset=utf-8",
    }
}

/// `scheme://host` of the request, for feeds without a configured url.
fn request_base_url(req: &Incoming<'_>) -> String {
    let scheme = match req.forwarded_proto {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    let host = req.host.unwrap_or("localhost");
    format!("{scheme}://{host}")
}

fn render_failure(key: &str, err: &RenderError) -> Reply {
    warn!("render"; "{key} failed: {err}");
    Reply::internal_error(err.code())
}

// ============================================================================
// Admin and Diagnostics
// ============================================================================

fn admin_refresh(ctx: &ServerContext, req: &Incoming<'_>) -> Reply {
    match ctx.auth.check(req.authorization) {
        AuthOutcome::Allowed => {}
        AuthOutcome::Denied => {
            warn!("admin"; "rejected refresh: invalid or missing bearer token");
            return Reply::text(401, "Unauthorized");
        }
        AuthOutcome::Unavailable => {
            warn!("admin"; "refresh requested but no admin token is configured");
            return Reply::text(503, "Admin endpoint disabled: no token configured");
        }
    }

    match ctx.coordinator.refresh() {
        Ok(report) => Reply::text(
            200,
            &format!(
                "OK generation {}: {} posts, {} pages ({} skipped)\n",
                report.generation, report.posts, report.pages, report.skipped
            ),
        ),
        Err(err) => {
            let code = match &err {
                RefreshError::Load { kind, .. } if kind.is_post() => "SHF-REFRESH-PO",
                RefreshError::Load { .. } => "SHF-REFRESH-PA",
            };
            warn!("refresh"; "failed: {}", error_chain(&err));
            Reply::internal_error(code)
        }
    }
}

fn healthz(generation: &Generation) -> Reply {
    let index = generation.index();
    let body = format!(
        "generation {}\nbuilt_at {}\nposts {}\npages {}\ntags {}\ncached {}\n",
        generation.id(),
        generation.built_at().to_rfc3339(),
        index.post_count(),
        index.page_count(),
        index.all_tags().count(),
        generation.cache().len()
    );
    Reply::text(200, &body)
}
