//! Sheaf - a Markdown blog server with snapshot-consistent refresh.

mod cache;
mod cli;
mod config;
mod content;
mod feed;
mod hook;
mod index;
mod logger;
mod render;
mod scaffold;
mod serve;
mod snapshot;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use hook::RefreshHook;
use index::ContentIndex;
use logger::error_chain;
use scaffold::new_content;
use serve::serve_site;
use snapshot::{ContentSources, SnapshotCoordinator};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;
    config.validate()?;

    match &cli.command {
        Commands::Serve { .. } => serve(&config),
        Commands::Check => check(&config),
        Commands::New { kind, slug } => new_content(&config, *kind, slug).map(|_| ()),
    }
}

/// Load content, publish generation 1, then serve until Ctrl+C.
fn serve(config: &SiteConfig) -> Result<()> {
    let sources = ContentSources::from_config(config)?;
    let hook = RefreshHook::new(&config.refresh.command, &config.root);
    let coordinator =
        SnapshotCoordinator::bootstrap(sources, hook).context("Initial content load failed")?;
    serve_site(config, Arc::new(coordinator))
}

/// Load all content once and print a summary.
fn check(config: &SiteConfig) -> Result<()> {
    let sources = ContentSources::from_config(config)?;
    let loaded = sources.load().context("Content check failed")?;
    let (skipped, drafts) = (loaded.skipped(), loaded.drafts());

    for file in loaded.posts.skipped.iter().chain(&loaded.pages.skipped) {
        println!(
            "skipped  {}: {}",
            file.path.display(),
            error_chain(&file.error)
        );
    }

    let index = ContentIndex::build(loaded.posts.entities, loaded.pages.entities);
    for (tag, count) in index.tag_counts() {
        debug!("check"; "#{tag}: {count}");
    }
    println!(
        "{} posts, {} pages, {} tags ({} skipped, {} drafts)",
        index.post_count(),
        index.page_count(),
        index.all_tags().count(),
        skipped,
        drafts
    );
    Ok(())
}
