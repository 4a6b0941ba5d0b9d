//! `[serve]` section configuration.
//!
//! Contains HTTP server settings.

use super::defaults;
use educe::Educe;
use serde::Deserialize;
use std::path::PathBuf;

/// `[serve]` section in sheaf.toml - HTTP server settings.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"  # Listen on all interfaces
/// port = 3000
/// workers = 8
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 8080).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// Request worker threads. `0` means one per available core.
    #[serde(default = "defaults::serve::workers")]
    #[educe(Default = defaults::serve::workers())]
    pub workers: usize,

    /// Debug mode: every request renders fresh and `/admin/*` needs no token.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub debug: bool,

    /// Refresh content automatically when files in the collections change.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub watch: bool,

    /// Minify rendered HTML before it is cached.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Directory served under `/static/`.
    #[serde(default = "defaults::serve::static_dir")]
    #[educe(Default = defaults::serve::static_dir())]
    pub static_dir: PathBuf,
}

impl ServeConfig {
    /// Number of worker threads to spawn.
    pub fn worker_count(&self) -> usize {
        match self.workers {
            0 => std::thread::available_parallelism().map_or(4, |n| n.get()),
            n => n,
        }
    }
}
