//! Metadata header parsing.
//!
//! A content file starts with a YAML block between two `---` lines:
//!
//! ```markdown
//! ---
//! title: "Hello"
//! date: "2024-01-01"
//! tags: [rust, web]
//! description: "Short summary"
//! draft: false
//! ---
//!
//! Body in **Markdown**.
//! ```

use super::{CollectionKind, FileError};
use chrono::NaiveDate;
use serde::Deserialize;

/// Fields accepted in the metadata header. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FrontMatter {
    pub title: String,

    /// `YYYY-MM-DD`, required for posts.
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub draft: bool,
}

impl FrontMatter {
    /// Deserialize the YAML header block.
    pub fn parse(header: &str) -> Result<Self, FileError> {
        Ok(serde_yaml::from_str(header)?)
    }

    /// Validate and parse `date` for the given collection.
    ///
    /// Posts must carry a date. Pages may omit it, but a present date must be valid.
    pub fn parse_date(&self, kind: CollectionKind) -> Result<Option<NaiveDate>, FileError> {
        match (&self.date, kind) {
            (None, CollectionKind::Post) => Err(FileError::MissingDate),
            (None, CollectionKind::Page) => Ok(None),
            (Some(raw), _) => parse_ymd(raw.trim())
                .map(Some)
                .ok_or_else(|| FileError::InvalidDate(raw.clone())),
        }
    }

    /// Tags in source order with duplicates and blanks removed.
    pub fn unique_tags(&self) -> Result<Vec<String>, FileError> {
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.iter().map(|t| t.trim()) {
            if tag.contains('/') {
                return Err(FileError::InvalidTag(tag.to_owned()));
            }
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_owned());
            }
        }
        Ok(tags)
    }
}

/// Parse a strict `YYYY-MM-DD` date.
fn parse_ymd(s: &str) -> Option<NaiveDate> {
    // chrono accepts single-digit months and days, the header format does not
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Split a source file into its metadata header and body.
///
/// Returns `None` when the file does not start with a `---` line or the
/// header is never closed.
pub fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "---\ntitle: \"Hello\"\ndate: 2024-01-01\ntags: [rust, web, rust]\n---\n\n# Body\n";

    #[test]
    fn test_split_front_matter() {
        let (header, body) = split_front_matter(SAMPLE).unwrap();
        assert!(header.starts_with("title:"));
        assert!(header.ends_with("]\n"));
        assert_eq!(body, "\n# Body\n");
    }

    #[test]
    fn test_split_front_matter_crlf_and_bom() {
        let source = "\u{feff}---\r\ntitle: x\r\n---\r\nbody";
        let (header, body) = split_front_matter(source).unwrap();
        assert_eq!(header, "title: x\r\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_front_matter_missing() {
        assert!(split_front_matter("# No header\n").is_none());
        assert!(split_front_matter("---\ntitle: never closed\n").is_none());
        assert!(split_front_matter("----\ntitle: x\n---\n").is_none());
    }

    #[test]
    fn test_parse_defaults() {
        let meta = FrontMatter::parse("title: Only a title\n").unwrap();
        assert_eq!(meta.title, "Only a title");
        assert!(meta.date.is_none());
        assert!(meta.tags.is_empty());
        assert!(meta.description.is_empty());
        assert!(!meta.draft);
    }

    #[test]
    fn test_parse_requires_title() {
        assert!(matches!(
            FrontMatter::parse("date: 2024-01-01\n"),
            Err(FileError::Metadata(_))
        ));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        assert!(FrontMatter::parse("title: [unclosed\n").is_err());
        assert!(FrontMatter::parse("title: x\ntags: 12\n").is_err());
    }

    #[test]
    fn test_unique_tags_preserve_order() {
        let (header, _) = split_front_matter(SAMPLE).unwrap();
        let meta = FrontMatter::parse(header).unwrap();
        assert_eq!(meta.unique_tags().unwrap(), ["rust", "web"]);
    }

    #[test]
    fn test_tag_with_slash_is_rejected() {
        let meta = FrontMatter::parse("title: x\ntags: [rust, c/c++]\n").unwrap();
        assert!(matches!(meta.unique_tags(), Err(FileError::InvalidTag(tag)) if tag == "c/c++"));
    }

    #[test]
    fn test_parse_date_rules() {
        let mut meta = FrontMatter::parse("title: x\n").unwrap();
        assert!(matches!(
            meta.parse_date(CollectionKind::Post),
            Err(FileError::MissingDate)
        ));
        assert_eq!(meta.parse_date(CollectionKind::Page).unwrap(), None);

        meta.date = Some("2024-02-30".into());
        assert!(matches!(
            meta.parse_date(CollectionKind::Page),
            Err(FileError::InvalidDate(_))
        ));

        meta.date = Some("2024-2-3".into());
        assert!(meta.parse_date(CollectionKind::Post).is_err());

        meta.date = Some("2024-02-29".into());
        assert_eq!(
            meta.parse_date(CollectionKind::Post).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }
}
