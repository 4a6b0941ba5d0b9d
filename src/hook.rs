//! Post-refresh hook.
//!
//! Runs a configured external command (e.g. `bun run build-css`) on a
//! detached thread after each successful refresh. The hook never reports
//! back: a missing program or a failing run is logged and forgotten.

use crate::{debug, log, warn};
use anyhow::{Context, Result, bail};
use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
    thread,
};

/// A command run in the site root after content has been republished.
#[derive(Debug, Clone)]
pub struct RefreshHook {
    command: Vec<String>,
    root: PathBuf,
}

impl RefreshHook {
    /// `None` when no command is configured.
    pub fn new(command: &[String], root: &Path) -> Option<Self> {
        if command.first().is_none_or(String::is_empty) {
            return None;
        }
        Some(Self {
            command: command.to_vec(),
            root: root.to_path_buf(),
        })
    }

    pub fn program(&self) -> &str {
        &self.command[0]
    }

    /// Run the hook in the background.
    pub fn fire(&self) -> Option<thread::JoinHandle<()>> {
        let hook = self.clone();
        thread::Builder::new()
            .name("refresh-hook".into())
            .spawn(move || hook.run_logged())
            .inspect_err(|err| warn!("hook"; "failed to start hook thread: {err}"))
            .ok()
    }

    fn run_logged(&self) {
        let program = self.program();
        if which::which(program).is_err() {
            warn!("hook"; "`{program}` not found in PATH, skipping");
            return;
        }

        log!("hook"; "running `{}`", self.command.join(" "));
        match exec(&self.root, &self.command) {
            Ok(_) => log!("hook"; "`{program}` finished"),
            Err(err) => warn!("hook"; "{err:#}"),
        }
    }
}

/// Execute `cmd` in `root`, capturing its output.
///
/// Fails if the program cannot be started or exits non-zero.
fn exec(root: &Path, cmd: &[String]) -> Result<Output> {
    let (name, args) = cmd.split_first().context("Empty command")?;

    let output = Command::new(name)
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        let detail = stderr.trim();
        if detail.is_empty() {
            bail!("Command `{name}` failed with {}", output.status);
        }
        bail!("Command `{name}` failed with {}\n{detail}", output.status);
    }

    for line in stdout.lines().chain(stderr.lines()) {
        if !line.trim().is_empty() {
            debug!(name; "{line}");
        }
    }

    Ok(output)
}
