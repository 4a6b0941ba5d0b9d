//! Collection loading.
//!
//! Enumerates one directory, parses every matching file in parallel, then
//! reports skips and drafts sequentially so log output stays in file order.

use super::{
    CollectionKind, ContentEntity, ContentError, FileError,
    markdown::MarkdownRenderer,
    meta::{FrontMatter, split_front_matter},
    slug::slug_for,
};
use crate::{debug, log, logger::error_chain, warn};
use globset::{Glob, GlobMatcher};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use walkdir::WalkDir;

/// A file that was enumerated but could not be turned into an entity.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: FileError,
}

/// Result of loading one collection directory.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Posts newest first, pages in file-name order.
    pub entities: Vec<ContentEntity>,
    pub skipped: Vec<SkippedFile>,
    /// Number of files dropped because they are marked `draft: true`.
    pub drafts: usize,
}

/// Per-file parse result.
enum Parsed {
    Entity(Box<ContentEntity>),
    Draft,
}

/// Loads collection directories with a fixed file pattern and renderer.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    matcher: GlobMatcher,
    renderer: MarkdownRenderer,
}

impl ContentLoader {
    pub fn new(pattern: &str, theme: &str) -> Result<Self, ContentError> {
        let matcher = Glob::new(pattern)
            .map_err(|source| ContentError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            })?
            .compile_matcher();
        let renderer = MarkdownRenderer::new(theme)
            .ok_or_else(|| ContentError::UnknownTheme(theme.to_owned()))?;
        Ok(Self { matcher, renderer })
    }

    /// Load every matching file in `dir` as entities of `kind`.
    ///
    /// # Errors
    ///
    /// - [`ContentError::NoContentFound`] if nothing matches (or `dir` is unreadable)
    /// - [`ContentError::NoUsableContent`] if every matching file was rejected
    pub fn load(&self, dir: &Path, kind: CollectionKind) -> Result<LoadOutcome, ContentError> {
        let start = Instant::now();
        let files = self.enumerate(dir);
        if files.is_empty() {
            return Err(ContentError::NoContentFound {
                dir: dir.to_path_buf(),
            });
        }

        // par_iter().map().collect() keeps input order
        let results: Vec<Result<Parsed, FileError>> = files
            .par_iter()
            .map(|path| self.parse_file(path, kind))
            .collect();

        let mut outcome = LoadOutcome::default();
        for (path, result) in files.into_iter().zip(results) {
            match result {
                Ok(Parsed::Entity(entity)) => outcome.entities.push(*entity),
                Ok(Parsed::Draft) => {
                    debug!("content"; "draft skipped: {}", path.display());
                    outcome.drafts += 1;
                }
                Err(error) => {
                    warn!("content"; "skipping {}: {}", path.display(), error_chain(&error));
                    outcome.skipped.push(SkippedFile { path, error });
                }
            }
        }

        if outcome.entities.is_empty() && outcome.drafts == 0 {
            return Err(ContentError::NoUsableContent {
                dir: dir.to_path_buf(),
                rejected: outcome.skipped.len(),
            });
        }

        if kind.is_post() {
            // stable: equal dates keep file-name order
            outcome.entities.sort_by(|a, b| b.date.cmp(&a.date));
        }

        log!(
            "content";
            "loaded {} {} from {} in {:.2?} ({} skipped, {} drafts)",
            outcome.entities.len(),
            kind.plural(),
            dir.display(),
            start.elapsed(),
            outcome.skipped.len(),
            outcome.drafts
        );
        Ok(outcome)
    }

    /// Matching regular files directly inside `dir`, sorted by file name.
    fn enumerate(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matcher.is_match(e.file_name()))
            .map(walkdir::DirEntry::into_path)
            .collect()
    }

    fn parse_file(&self, path: &Path, kind: CollectionKind) -> Result<Parsed, FileError> {
        let slug = slug_for(path, kind)?;
        let source = fs::read_to_string(path).map_err(FileError::Read)?;
        let (header, body) = split_front_matter(&source).ok_or(FileError::MissingHeader)?;
        let meta = FrontMatter::parse(header)?;

        if meta.draft {
            return Ok(Parsed::Draft);
        }

        let date = meta.parse_date(kind)?;
        let tags = meta.unique_tags()?;
        let html = self.renderer.render(body)?;

        Ok(Parsed::Entity(Box::new(ContentEntity {
            slug,
            tags,
            title: meta.title,
            date,
            description: meta.description,
            html,
            kind,
            source: path.to_path_buf(),
        })))
    }
}
