//! Content directory watcher.
//!
//! Watches the post and page directories and runs a full refresh once a
//! burst of file events has settled.
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────────────────────┐
//! │ notify   │───▶│ Debouncer │───▶│ coordinator.refresh()    │
//! │ events   │    │ (300ms)   │    │ (new generation or warn) │
//! └──────────┘    └───────────┘    └──────────────────────────┘
//! ```

use crate::{debug, log, logger::error_chain, snapshot::SnapshotCoordinator, warn};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{RecvTimeoutError, channel},
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;
const REFRESH_COOLDOWN_MS: u64 = 800;

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and refresh cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_refresh: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_refresh: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_refresh
            .is_some_and(|t| t.elapsed() < Duration::from_millis(REFRESH_COOLDOWN_MS))
    }

    /// Any non-temp path restarts the window, even one already pending.
    fn add(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        let mut touched = false;
        for path in paths.into_iter().filter(|p| !is_temp_file(p)) {
            self.pending.insert(path);
            touched = true;
        }
        if touched {
            self.last_event = Some(Instant::now());
        }
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn mark_refresh(&mut self) {
        self.last_refresh = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

/// Refresh after a settled batch. Returns true on success (for cooldown).
fn handle_changes(paths: &[PathBuf], coordinator: &SnapshotCoordinator) -> bool {
    match paths {
        [] => return false,
        [one] => log!("watch"; "{} changed, refreshing", one.display()),
        many => log!("watch"; "{} files changed, refreshing", many.len()),
    }

    match coordinator.refresh() {
        Ok(_) => true,
        Err(err) => {
            warn!("watch"; "refresh failed, keeping current content: {}", error_chain(&err));
            false
        }
    }
}

/// Watch the content directories until the event channel closes.
pub fn watch_for_changes_blocking(coordinator: &SnapshotCoordinator) -> Result<()> {
    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;

    for dir in coordinator.sources().dirs() {
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        log!("watch"; "{}/", dir.display());
    }

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) && !debouncer.in_cooldown() => {
                debouncer.add(event.paths);
            }
            Ok(Ok(event)) => debug!("watch"; "ignored {:?}", event.kind),
            Ok(Err(e)) => warn!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                if handle_changes(&debouncer.take(), coordinator) {
                    debouncer.mark_refresh();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_files() {
        for name in ["a.md.swp", "a.bak", "notes.md~", ".#a.md", "x.tmp"] {
            assert!(is_temp_file(Path::new(name)), "{name}");
        }
        assert!(!is_temp_file(Path::new("posts/2024-01-01-a.md")));
    }

    #[test]
    fn test_debouncer_batches_and_drops_temp_files() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.ready());
        assert_eq!(debouncer.timeout(), Duration::from_secs(60));

        debouncer.add([PathBuf::from("a.md"), PathBuf::from("a.md.swp")]);
        debouncer.add([PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert_eq!(debouncer.timeout(), Duration::from_millis(DEBOUNCE_MS));
        // still inside the debounce window
        assert!(!debouncer.ready());

        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS));
        assert!(debouncer.ready());

        let mut paths = debouncer.take();
        paths.sort();
        assert_eq!(paths, [PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_repeated_write_extends_window() {
        let mut debouncer = Debouncer::new();
        debouncer.add([PathBuf::from("a.md")]);
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS));
        assert!(debouncer.ready());

        // same file again: the burst is not over yet
        debouncer.add([PathBuf::from("a.md")]);
        assert!(!debouncer.ready());
        assert_eq!(debouncer.take(), [PathBuf::from("a.md")]);
    }

    #[test]
    fn test_only_temp_files_never_ready() {
        let mut debouncer = Debouncer::new();
        debouncer.add([PathBuf::from(".hidden.md")]);
        assert!(debouncer.last_event.is_none());
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_cooldown_after_refresh() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.in_cooldown());
        debouncer.mark_refresh();
        assert!(debouncer.in_cooldown());
    }
}
