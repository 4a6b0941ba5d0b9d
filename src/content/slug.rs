//! Slug derivation from content filenames.
//!
//! - posts: `2024-01-31-hello-world.md` → `hello-world`
//! - pages: `about.md` → `about`

use super::{CollectionKind, FileError};
use regex::Regex;
use std::{path::Path, sync::LazyLock};

/// Post filename convention: date prefix, lowercase slug, one extension.
static POST_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-[a-z0-9-]+\.[A-Za-z0-9]+$").unwrap());

/// Allowed characters for slugs created by `sheaf new`.
static SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Length of the `YYYY-MM-DD-` prefix on post filenames.
const DATE_PREFIX_LEN: usize = 11;

/// Derive the slug of a content file from its path.
pub fn slug_for(path: &Path, kind: CollectionKind) -> Result<String, FileError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FileError::InvalidFilename {
            name: path.display().to_string(),
            expected: "a UTF-8 file name",
        })?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    match kind {
        CollectionKind::Post if !POST_FILENAME.is_match(name) => Err(FileError::InvalidFilename {
            name: name.to_owned(),
            expected: "YYYY-MM-DD-slug.md",
        }),
        CollectionKind::Post => Ok(stem[DATE_PREFIX_LEN..].to_owned()),
        CollectionKind::Page => Ok(stem.to_owned()),
    }
}

/// Whether `slug` is usable for a new post or page file.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_slug_strips_date_and_extension() {
        let slug = slug_for(Path::new("posts/2024-01-01-hello.md"), CollectionKind::Post).unwrap();
        assert_eq!(slug, "hello");

        let slug = slug_for(
            Path::new("2023-12-31-rust-2024-edition.md"),
            CollectionKind::Post,
        )
        .unwrap();
        assert_eq!(slug, "rust-2024-edition");
    }

    #[test]
    fn test_post_filename_must_match_convention() {
        for name in [
            "hello.md",
            "2024-1-01-hello.md",
            "2024-01-01-Hello.md",
            "2024-01-01-hello_world.md",
            "2024-01-01-.md",
            "2024-01-01-hello",
        ] {
            let result = slug_for(Path::new(name), CollectionKind::Post);
            assert!(
                matches!(result, Err(FileError::InvalidFilename { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_page_slug_is_stem() {
        let slug = slug_for(Path::new("pages/About_Me.md"), CollectionKind::Page).unwrap();
        assert_eq!(slug, "About_Me");

        // no date requirement for pages
        let slug = slug_for(Path::new("2024-01-01-now.md"), CollectionKind::Page).unwrap();
        assert_eq!(slug, "2024-01-01-now");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("hello-world-2"));
        assert!(!is_valid_slug("Hello"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug(""));
    }
}
