//! `sheaf new`: scaffold a draft post or page.

use crate::{cli::NewKind, config::SiteConfig, content::is_valid_slug, log, warn};
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use globset::Glob;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

const BODY: &str = "\
Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod
tempor incididunt ut labore et dolore magna aliqua.

Remove `draft: true` above to publish.
";

/// Create a new draft file and return its path.
pub fn new_content(config: &SiteConfig, kind: NewKind, slug: &str) -> Result<PathBuf> {
    let dir = match kind {
        NewKind::Post => &config.content.posts,
        NewKind::Page => &config.content.pages,
    };
    let path = scaffold(dir, kind, slug, Local::now().date_naive())?;

    let name = path.file_name().unwrap_or_default();
    if let Ok(glob) = Glob::new(&config.content.pattern)
        && !glob.compile_matcher().is_match(name)
    {
        warn!(
            "new";
            "{} does not match [content.pattern] `{}` and will not be loaded",
            name.to_string_lossy(),
            config.content.pattern
        );
    }

    log!("new"; "created {}", path.display());
    Ok(path)
}

fn scaffold(dir: &Path, kind: NewKind, slug: &str, today: NaiveDate) -> Result<PathBuf> {
    if !is_valid_slug(slug) {
        bail!("Invalid slug `{slug}`: use lowercase letters, digits and dashes");
    }

    let today = today.format("%Y-%m-%d").to_string();
    let file_name = match kind {
        NewKind::Post => format!("{today}-{slug}.md"),
        NewKind::Page => format!("{slug}.md"),
    };
    let path = dir.join(file_name);

    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    // create_new: never overwrite an existing file
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(template(kind, slug, &today).as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

fn template(kind: NewKind, slug: &str, today: &str) -> String {
    let title = title_from_slug(slug);
    let date = match kind {
        NewKind::Post => format!("date: \"{today}\"\n"),
        NewKind::Page => String::new(),
    };
    format!("---\ntitle: \"{title}\"\n{date}tags: []\ndescription: \"\"\ndraft: true\n---\n\n{BODY}")
}

/// `hello-world` → `Hello World`
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
