//! Content ingestion: Markdown files with a YAML header become [`ContentEntity`]s.
//!
//! # Pipeline
//!
//! ```text
//! content/posts/2024-01-01-hello.md
//!        │
//!        ├── slug::slug_for()         filename convention → "hello"
//!        ├── meta::split_front_matter  "---" header │ body
//!        ├── meta::FrontMatter         title, date, tags, description, draft
//!        └── markdown::render()        body → HTML (raw HTML omitted, code highlighted)
//!        │
//!        ▼
//!   ContentEntity (or skipped with a warning, or dropped as a draft)
//! ```
//!
//! Loading one directory is [`ContentLoader::load`]. Per-file problems never
//! abort a load; only an empty directory, a bad pattern, or a directory where
//! every file was rejected does.

mod error;
mod loader;
pub mod markdown;
mod meta;
mod slug;

pub use error::{ContentError, FileError};
pub use loader::{ContentLoader, LoadOutcome};
pub use slug::is_valid_slug;

use chrono::NaiveDate;
use std::{fmt, path::PathBuf};

/// Which collection an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Dated entries, listed newest first, filename `YYYY-MM-DD-slug.md`.
    Post,
    /// Standalone entries addressed by their filename stem.
    Page,
}

impl CollectionKind {
    pub const fn is_post(self) -> bool {
        matches!(self, Self::Post)
    }

    pub const fn plural(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Page => "pages",
        }
    }

    /// Logical route of an entity of this kind.
    pub fn route(self, slug: &str) -> String {
        match self {
            Self::Post => format!("/blog/{slug}"),
            Self::Page => format!("/{slug}"),
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Post => "post",
            Self::Page => "page",
        })
    }
}

/// One published post or page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntity {
    /// URL identifier derived from the filename.
    pub slug: String,
    pub title: String,
    /// Always present for posts; optional for pages.
    pub date: Option<NaiveDate>,
    /// Source order, duplicates removed.
    pub tags: Vec<String>,
    pub description: String,
    /// Rendered body.
    pub html: String,
    pub kind: CollectionKind,
    /// File the entity was loaded from.
    pub source: PathBuf,
}

impl ContentEntity {
    /// Logical route of this entity, e.g. `/blog/hello`.
    pub fn route(&self) -> String {
        self.kind.route(&self.slug)
    }

    /// `YYYY-MM-DD`, or an empty string for undated pages.
    pub fn date_string(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
