//! `[admin]` section configuration.
//!
//! Where the bearer token guarding `POST /admin/refresh` comes from.

use super::defaults;
use educe::Educe;
use serde::Deserialize;
use std::{fs, path::PathBuf};

/// `[admin]` section in sheaf.toml.
///
/// The environment variable wins over the token file.
///
/// # Example
/// ```toml
/// [admin]
/// token_env = "SHEAF_ADMIN_TOKEN"
/// token_path = "~/.config/sheaf/token"
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Name of the environment variable holding the token.
    #[serde(default = "defaults::admin::token_env")]
    #[educe(Default = defaults::admin::token_env())]
    pub token_env: String,

    /// File holding the token (tilde-expanded, whitespace trimmed).
    #[serde(default = "defaults::admin::token_path")]
    #[educe(Default = defaults::admin::token_path())]
    pub token_path: Option<PathBuf>,
}

impl AdminConfig {
    /// Resolve the configured admin token, if any.
    ///
    /// Empty values count as "not configured".
    pub fn resolve_token(&self) -> Option<String> {
        let non_empty = |token: String| {
            let token = token.trim();
            (!token.is_empty()).then(|| token.to_owned())
        };

        std::env::var(&self.token_env)
            .ok()
            .and_then(non_empty)
            .or_else(|| {
                self.token_path
                    .as_ref()
                    .and_then(|path| fs::read_to_string(path).ok())
                    .and_then(non_empty)
            })
    }
}
