//! `[refresh]` section configuration.

use serde::Deserialize;

/// `[refresh]` section in sheaf.toml.
///
/// # Example
/// ```toml
/// [refresh]
/// command = ["bun", "run", "build-css"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshConfig {
    /// Command run in the site root after every successful refresh and once
    /// at startup. Best effort: its failure never fails the refresh.
    #[serde(default)]
    pub command: Vec<String>,
}
