//! Recording implementations of [`FileSystem`] and [`CommandRunner`].
//!
//! Mutations are captured in memory; reads fall back to the host so that a
//! dry run sees the real starting state.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::{command_line, CommandRunner};
use crate::error::{CommandError, Result};
use crate::fs::{FileInfo, FileSystem, RealFileSystem};
use crate::process::DryRunProcess;

#[derive(Debug, Default)]
struct FsState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    written: BTreeMap<PathBuf, Vec<u8>>,
    removed: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
}

/// [`FileSystem`] that records writes, directory creation and removals
/// instead of performing them.
#[derive(Debug, Default)]
pub struct DryRunFileSystem {
    state: Mutex<FsState>,
}

impl DryRunFileSystem {
    /// Creates an empty dry-run filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file that reads will see before the host filesystem.
    pub fn add_file(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.state.lock().files.insert(path.into(), data.into());
    }

    /// Returns every recorded write, keyed by path. Later writes replace earlier ones.
    #[must_use]
    pub fn written_files(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// Returns every directory passed to `mkdir_all`.
    #[must_use]
    pub fn created_dirs(&self) -> BTreeSet<PathBuf> {
        self.state.lock().dirs.clone()
    }

    /// Returns every path passed to `remove`.
    #[must_use]
    pub fn removed_files(&self) -> BTreeSet<PathBuf> {
        self.state.lock().removed.clone()
    }
}

impl FileSystem for DryRunFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        {
            let state = self.state.lock();
            if let Some(data) = state.written.get(path).or_else(|| state.files.get(path)) {
                return Ok(data.clone());
            }
        }
        fs::read(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        debug!(path = %path.display(), bytes = data.len(), mode = %format!("{mode:o}"), "dry-run: would write file");
        self.state.lock().written.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        {
            let state = self.state.lock();
            if let Some(data) = state.written.get(path).or_else(|| state.files.get(path)) {
                return Ok(FileInfo {
                    path: path.to_path_buf(),
                    is_dir: false,
                    len: data.len() as u64,
                    mode: 0o644,
                });
            }
            if state.dirs.contains(path) {
                return Ok(FileInfo {
                    path: path.to_path_buf(),
                    is_dir: true,
                    len: 0,
                    mode: 0o755,
                });
            }
        }
        RealFileSystem.stat(path)
    }

    fn exists(&self, path: &Path) -> bool {
        {
            let state = self.state.lock();
            if state.files.contains_key(path) || state.written.contains_key(path) || state.dirs.contains(path) {
                return true;
            }
        }
        RealFileSystem.exists(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "dry-run: would remove path");
        self.state.lock().removed.insert(path.to_path_buf());
        Ok(())
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        debug!(path = %path.display(), mode = %format!("{mode:o}"), "dry-run: would create directory");
        self.state.lock().dirs.insert(path.to_path_buf());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RunnerState {
    log: Vec<String>,
    outputs: HashMap<String, Vec<u8>>,
    errors: HashMap<String, CommandError>,
}

/// [`CommandRunner`] that logs invocations and returns canned responses.
///
/// Responses are keyed by the full command line as built by
/// [`command_line`]. A registered error takes precedence over a registered
/// output; with neither, the call succeeds with empty output.
#[derive(Debug, Default)]
pub struct DryRunCommandRunner {
    state: Mutex<RunnerState>,
}

impl DryRunCommandRunner {
    /// Creates a runner with an empty log and no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the output returned for `command`.
    pub fn add_output(&self, command: impl Into<String>, output: impl Into<Vec<u8>>) {
        self.state.lock().outputs.insert(command.into(), output.into());
    }

    /// Registers the error returned for `command`.
    pub fn add_error(&self, command: impl Into<String>, error: CommandError) {
        self.state.lock().errors.insert(command.into(), error);
    }

    /// Returns every command line invoked so far, in order.
    #[must_use]
    pub fn run_commands(&self) -> Vec<String> {
        self.state.lock().log.clone()
    }

    /// Returns the last `n` command lines, or all of them if fewer were run.
    #[must_use]
    pub fn last_commands(&self, n: usize) -> Vec<String> {
        let state = self.state.lock();
        let start = state.log.len().saturating_sub(n);
        state.log[start..].to_vec()
    }

    /// Returns the command lines containing `needle`. An empty needle matches all.
    #[must_use]
    pub fn commands_matching(&self, needle: &str) -> Vec<String> {
        self.state
            .lock()
            .log
            .iter()
            .filter(|line| line.contains(needle))
            .cloned()
            .collect()
    }

    /// Resets the log and every canned response.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.log.clear();
        state.outputs.clear();
        state.errors.clear();
    }

    fn record(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Vec<u8>> {
        let line = command_line(name, args);
        if cancel.is_cancelled() {
            return Err(CommandError::cancelled(line));
        }

        debug!(command = %line, "dry-run: would run command");
        let mut state = self.state.lock();
        state.log.push(line.clone());
        if let Some(err) = state.errors.get(&line) {
            return Err(err.clone());
        }
        Ok(state.outputs.get(&line).cloned().unwrap_or_default())
    }
}

impl CommandRunner for DryRunCommandRunner {
    type Process = DryRunProcess;

    async fn run(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<()> {
        self.record(cancel, name, args).map(|_| ())
    }

    async fn output(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Vec<u8>> {
        self.record(cancel, name, args)
    }

    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>> {
        self.record(cancel, name, args)
    }

    async fn start(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<DryRunProcess> {
        self.record(cancel, name, args).map(|_| DryRunProcess::new())
    }

    fn look_path(&self, name: &str) -> Result<PathBuf> {
        Ok(PathBuf::from(format!("/usr/bin/{name}")))
    }
}
