//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sheaf blog server CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Site root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: sheaf.toml)
    #[arg(short = 'C', long, default_value = "sheaf.toml")]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Kind of content file to scaffold
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewKind {
    Post,
    Page,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load content and serve it over HTTP
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// Number of request worker threads (0 = one per core)
        #[arg(long)]
        workers: Option<usize>,

        /// Disable the page cache and admin authentication
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        debug: Option<bool>,

        /// Refresh automatically when content files change
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Load all content once and report problems
    Check,

    /// Create a new draft post or page
    New {
        /// post or page
        #[arg(value_enum)]
        kind: NewKind,

        /// Slug for the new file (lowercase letters, digits and dashes)
        slug: String,
    },
}
