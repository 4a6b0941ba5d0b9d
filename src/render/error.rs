//! Render error types.

use thiserror::Error;

/// Failure to produce a response body.
///
/// Surfaced to clients only as an opaque [`code`](RenderError::code); the
/// full message goes to the log.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("feed base url `{0}` is not an absolute http(s) url")]
    InvalidBaseUrl(String),

    #[error("rss validation failed: {0}")]
    Feed(String),
}

impl RenderError {
    /// Short code shown in the 500 response body.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl(_) => "SHF-FEED-URL",
            Self::Feed(_) => "SHF-FEED-VAL",
        }
    }
}
