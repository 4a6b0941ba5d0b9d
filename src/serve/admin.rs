//! Bearer authentication for `/admin/*`.

use crate::config::SiteConfig;

/// How admin requests are authorized.
#[derive(Debug, Clone)]
pub enum AdminAuth {
    /// Debug mode: no token required.
    Open,
    /// Digest of the configured token.
    Token(blake3::Hash),
    /// No token configured outside debug mode: admin routes are unavailable.
    Unconfigured,
}

/// Result of checking one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Allowed,
    Denied,
    Unavailable,
}

impl AdminAuth {
    pub fn from_config(config: &SiteConfig) -> Self {
        if config.serve.debug {
            return Self::Open;
        }
        config
            .admin
            .resolve_token()
            .map_or(Self::Unconfigured, |token| Self::with_token(&token))
    }

    pub fn with_token(token: &str) -> Self {
        Self::Token(blake3::hash(token.as_bytes()))
    }

    /// Check an `Authorization` header value.
    ///
    /// Both tokens are hashed first; `blake3::Hash` equality is constant-time.
    pub fn check(&self, authorization: Option<&str>) -> AuthOutcome {
        match self {
            Self::Open => AuthOutcome::Allowed,
            Self::Unconfigured => AuthOutcome::Unavailable,
            Self::Token(expected) => match authorization.and_then(bearer_token) {
                Some(token) if blake3::hash(token.as_bytes()) == *expected => AuthOutcome::Allowed,
                _ => AuthOutcome::Denied,
            },
        }
    }
}

/// Extract the token from `Bearer <token>`.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
