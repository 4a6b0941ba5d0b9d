//! HTTP server.
//!
//! A fixed pool of worker threads pulls requests from one shared
//! `tiny_http` listener. Each request is translated into an [`Incoming`],
//! answered by [`handler::handle`], and written back.
//!
//! ```text
//!             ┌──────────────────┐
//!  clients ──▶│ tiny_http Server │
//!             └────────┬─────────┘
//!        recv()        │        recv()
//!     ┌────────────────┼────────────────┐
//!     ▼                ▼                ▼
//!  worker 0         worker 1    ...  worker N-1
//!     │                │                │
//!     └──── coordinator.snapshot() ─────┘
//!                      │
//!             Generation (index + cache)
//! ```
//!
//! Ctrl+C sets the shutdown flag and unblocks every worker.

mod admin;
mod files;
mod handler;
mod route;

use crate::{
    config::SiteConfig, debug, log, snapshot::SnapshotCoordinator, warn,
    watch::watch_for_changes_blocking,
};
use admin::AdminAuth;
use anyhow::{Context, Result, anyhow};
use handler::{Incoming, Method, Reply, ServerContext};
use std::{
    io::Cursor,
    net::{IpAddr, SocketAddr},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Requests slower than this are logged as warnings.
const SLOW_REQUEST: Duration = Duration::from_secs(1);

/// Serve the site until Ctrl+C.
pub fn serve_site(config: &SiteConfig, coordinator: Arc<SnapshotCoordinator>) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);
    let workers = config.serve.worker_count();
    let shutdown = Arc::new(AtomicBool::new(false));

    {
        let server = Arc::clone(&server);
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            log!("serve"; "shutting down...");
            shutdown.store(true, Ordering::SeqCst);
            // each call releases one blocked recv()
            for _ in 0..workers {
                server.unblock();
            }
        })
        .context("Failed to set Ctrl+C handler")?;
    }

    let ctx = Arc::new(ServerContext::new(config, Arc::clone(&coordinator)));
    match ctx.auth {
        AdminAuth::Open => warn!("serve"; "debug mode: page cache and admin auth disabled"),
        AdminAuth::Unconfigured => {
            warn!("admin"; "no admin token configured, /admin/refresh is disabled");
        }
        AdminAuth::Token(_) => {}
    }

    coordinator.run_hook();

    if config.serve.watch {
        let coordinator = Arc::clone(&coordinator);
        thread::Builder::new()
            .name("watch".into())
            .spawn(move || {
                if let Err(err) = watch_for_changes_blocking(&coordinator) {
                    warn!("watch"; "{err:#}");
                }
            })
            .context("Failed to start watcher thread")?;
    }

    log!("serve"; "http://{} ({} workers)", addr, workers);

    let handles = (0..workers)
        .map(|i| {
            let server = Arc::clone(&server);
            let ctx = Arc::clone(&ctx);
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name(format!("worker-{i}"))
                .spawn(move || worker_loop(&server, &ctx, &shutdown))
                .context("Failed to start worker thread")
        })
        .collect::<Result<Vec<_>>>()?;

    for handle in handles {
        if handle.join().is_err() {
            warn!("serve"; "worker thread panicked");
        }
    }
    Ok(())
}

fn worker_loop(server: &Server, ctx: &ServerContext, shutdown: &AtomicBool) {
    loop {
        match server.recv() {
            Ok(request) => {
                if let Err(err) = respond(request, ctx) {
                    debug!("serve"; "failed to write response: {err}");
                }
            }
            Err(_) if shutdown.load(Ordering::SeqCst) => break,
            Err(err) => warn!("serve"; "accept error: {err}"),
        }
    }
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map_or_else(|| "no attempts made".to_owned(), |e| e.to_string())
    ))
}

// ============================================================================
// Request Translation
// ============================================================================

fn respond(request: Request, ctx: &ServerContext) -> Result<()> {
    let start = Instant::now();
    let method = match request.method() {
        tiny_http::Method::Get => Method::Get,
        tiny_http::Method::Head => Method::Head,
        tiny_http::Method::Post => Method::Post,
        _ => Method::Other,
    };

    let reply = {
        let incoming = Incoming {
            method,
            url: request.url(),
            authorization: header_value(&request, "Authorization"),
            host: header_value(&request, "Host"),
            forwarded_proto: header_value(&request, "X-Forwarded-Proto"),
        };
        handler::handle(ctx, &incoming)
    };

    log_request(request.method(), request.url(), reply.status, start.elapsed());
    // tiny_http drops the body itself for HEAD
    request.respond(into_response(reply)?)?;
    Ok(())
}

fn header_value<'a>(request: &'a Request, name: &'static str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn into_response(reply: Reply) -> Result<Response<Cursor<Arc<[u8]>>>> {
    let mut headers = vec![header("Content-Type", reply.content_type)?];
    if let Some(allow) = reply.allow {
        headers.push(header("Allow", allow)?);
    }
    let len = reply.body.len();
    Ok(Response::new(
        StatusCode(reply.status),
        headers,
        Cursor::new(reply.body),
        Some(len),
        None,
    ))
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow!("invalid header `{name}: {value}`"))
}

fn log_request(method: &tiny_http::Method, url: &str, status: u16, elapsed: Duration) {
    if url.starts_with("/static/") && status < 500 {
        return;
    }
    if status >= 500 {
        warn!("http"; "{method} {url} {status} {elapsed:.2?}");
    } else if elapsed >= SLOW_REQUEST {
        warn!("http"; "{method} {url} {status} slow: {elapsed:.2?}");
    } else {
        debug!("http"; "{method} {url} {status} {elapsed:.2?}");
    }
}
