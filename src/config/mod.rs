//! Site configuration management for `sheaf.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[site]`    | Site metadata (title, author, url, feed size)  |
//! | `[content]` | Collection directories, file pattern, theme    |
//! | `[serve]`   | HTTP server (port, interface, workers, debug)  |
//! | `[admin]`   | Source of the admin bearer token               |
//! | `[refresh]` | Best-effort command run after each refresh     |
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! description = "A personal blog"
//! url = "https://example.com"
//!
//! [content]
//! posts = "content/posts"
//! pages = "content/pages"
//!
//! [serve]
//! port = 8080
//!
//! [refresh]
//! command = ["bun", "run", "build-css"]
//! ```

mod admin;
mod content;
pub mod defaults;
mod error;
mod refresh;
mod serve;
mod site;

pub use admin::AdminConfig;
pub use content::ContentSection;
pub use error::ConfigError;
pub use refresh::RefreshConfig;
pub use serve::ServeConfig;
pub use site::SiteSection;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use globset::Glob;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing sheaf.toml
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute site root (set after loading)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub site: SiteSection,

    /// Content collections
    #[serde(default)]
    pub content: ContentSection,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Admin endpoint settings
    #[serde(default)]
    pub admin: AdminConfig,

    /// Post-refresh hook
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config named by the CLI, falling back to defaults when the
    /// file does not exist, then apply CLI overrides and resolve paths.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
        self.update_path_with_root(&root);

        if let Commands::Serve {
            interface,
            port,
            workers,
            debug,
            watch,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.workers, workers.as_ref());
            Self::update_option(&mut self.serve.debug, debug.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let root = Self::normalize_path(root);

        self.content.posts = Self::normalize_path(&root.join(&self.content.posts));
        self.content.pages = Self::normalize_path(&root.join(&self.content.pages));
        self.serve.static_dir = Self::normalize_path(&root.join(&self.serve.static_dir));

        // Token path may start with `~`
        if let Some(token_path) = &self.admin.token_path {
            let expanded = shellexpand::tilde(&token_path.to_string_lossy()).into_owned();
            let path = PathBuf::from(expanded);
            self.admin.token_path = Some(if path.is_relative() {
                Self::normalize_path(&root.join(path))
            } else {
                Self::normalize_path(&path)
            });
        }

        self.root = root;
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.site.url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            bail!(ConfigError::invalid("site.url", "must start with http:// or https://"));
        }
        if self.site.home_posts == 0 {
            bail!(ConfigError::invalid("site.home_posts", "must be greater than 0"));
        }
        if self.site.feed_items == 0 {
            bail!(ConfigError::invalid("site.feed_items", "must be greater than 0"));
        }
        if let Err(err) = Glob::new(&self.content.pattern) {
            bail!(ConfigError::invalid(
                "content.pattern",
                format!("is not a valid glob: {err}")
            ));
        }
        if !crate::content::markdown::has_theme(&self.content.highlight_theme) {
            bail!(ConfigError::invalid(
                "content.highlight_theme",
                format!("unknown theme `{}`", self.content.highlight_theme)
            ));
        }
        if self.refresh.command.first().is_some_and(String::is_empty) {
            bail!(ConfigError::invalid(
                "refresh.command",
                "program name must not be empty"
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
