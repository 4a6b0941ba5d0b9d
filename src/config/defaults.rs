//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn title() -> String {
        "My Blog".into()
    }

    pub fn url() -> Option<String> {
        None
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn language() -> String {
        "en".into()
    }

    pub fn home_posts() -> usize {
        5
    }

    pub fn feed_items() -> usize {
        20
    }
}

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    use std::path::PathBuf;

    pub fn posts() -> PathBuf {
        "content/posts".into()
    }

    pub fn pages() -> PathBuf {
        "content/pages".into()
    }

    pub fn pattern() -> String {
        "*.md".into()
    }

    pub fn highlight_theme() -> String {
        "InspiredGitHub".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    use std::path::PathBuf;

    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn workers() -> usize {
        0
    }

    pub fn static_dir() -> PathBuf {
        "static".into()
    }
}

// ============================================================================
// [admin] Section Defaults
// ============================================================================

pub mod admin {
    use std::path::PathBuf;

    pub fn token_env() -> String {
        "SHEAF_ADMIN_TOKEN".into()
    }

    pub fn token_path() -> Option<PathBuf> {
        None
    }
}
