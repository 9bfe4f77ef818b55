//! Test fixtures: a scripted in-memory gateway and throwaway git repositories.

use super::parser::CommitSummary;
use super::{MiningError, VersionControl};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;

/// Content of one file in a scripted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Blob {
    Text(String),
    /// Present in the tree but cannot be read.
    Unreadable,
}

#[derive(Debug, Clone)]
struct Snapshot {
    hash: String,
    message: String,
    files: BTreeMap<String, Blob>,
}

/// In-memory gateway over a linear history of snapshots.
///
/// Snapshots are recorded oldest first; queries answer newest first the way
/// `git log` does.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    snapshots: Vec<Snapshot>,
    path_logs: Mutex<Vec<(String, String)>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commit whose tree is `files`.
    pub fn commit(mut self, hash: &str, files: &[(&str, Blob)]) -> Self {
        self.snapshots.push(Snapshot {
            hash: hash.to_string(),
            message: format!("commit {}", hash),
            files: files
                .iter()
                .map(|(path, blob)| (path.to_string(), blob.clone()))
                .collect(),
        });
        self
    }

    /// `(revision, path)` arguments of every `log_for_path` call so far.
    pub fn path_logs(&self) -> Vec<(String, String)> {
        self.path_logs.lock().unwrap().clone()
    }

    fn position(&self, revision: &str) -> Result<usize, MiningError> {
        if revision == "HEAD" && !self.snapshots.is_empty() {
            return Ok(self.snapshots.len() - 1);
        }
        self.snapshots
            .iter()
            .position(|s| s.hash == revision)
            .ok_or_else(|| MiningError::CommandFailed(format!("bad revision '{}'", revision)))
    }
}

pub fn text(content: &str) -> Blob {
    Blob::Text(content.to_string())
}

impl VersionControl for MemoryGateway {
    fn list_files(&self, revision: &str) -> Result<Vec<String>, MiningError> {
        let at = self.position(revision)?;
        Ok(self.snapshots[at].files.keys().cloned().collect())
    }

    fn full_log(&self, revision: &str) -> Result<Vec<CommitSummary>, MiningError> {
        let at = self.position(revision)?;
        Ok(self.snapshots[..=at]
            .iter()
            .rev()
            .map(|s| CommitSummary {
                hash: s.hash.clone(),
                date: "2024-01-01T00:00:00+00:00".to_string(),
                message: s.message.clone(),
                body: String::new(),
            })
            .collect())
    }

    fn log_for_path(&self, revision: &str, path: &str) -> Result<Vec<String>, MiningError> {
        self.path_logs
            .lock()
            .unwrap()
            .push((revision.to_string(), path.to_string()));

        let at = self.position(revision)?;
        let mut previous = None;
        let mut touched = Vec::new();
        for snapshot in &self.snapshots[..=at] {
            let current = snapshot.files.get(path);
            if current != previous {
                touched.push(snapshot.hash.clone());
            }
            previous = current;
        }
        touched.reverse();
        Ok(touched)
    }

    fn read_blob(&self, revision: &str, path: &str) -> Result<String, MiningError> {
        let at = self.position(revision)?;
        match self.snapshots[at].files.get(path) {
            Some(Blob::Text(content)) => Ok(content.clone()),
            Some(Blob::Unreadable) => Err(MiningError::CommandFailed(format!(
                "unable to read {}:{}",
                revision, path
            ))),
            None => Err(MiningError::CommandFailed(format!(
                "path '{}' does not exist in '{}'",
                path, revision
            ))),
        }
    }

    fn resolve(&self, name: &str) -> Result<String, MiningError> {
        let at = self.position(name)?;
        Ok(self.snapshots[at].hash.clone())
    }
}

/// A git repository in a temporary directory.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Initialise an empty repository, or `None` when git is missing.
    pub fn init() -> Option<Self> {
        if !Self::git_available() {
            return None;
        }
        let repo = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        repo.git(&["init", "-q"]);
        Some(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    /// Write a file whose name is arbitrary bytes inside `dir`.
    #[cfg(unix)]
    pub fn write_raw_name(&self, dir: &str, name: &[u8], content: &str) {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let parent = self.dir.path().join(dir);
        std::fs::create_dir_all(&parent).unwrap();
        std::fs::write(parent.join(OsStr::from_bytes(name)), content).unwrap();
    }

    /// Set a repository-local config value.
    pub fn config(&self, key: &str, value: &str) {
        self.git(&["config", key, value]);
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).unwrap();
    }

    /// Stage everything and commit; returns the new commit hash.
    pub fn commit(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&[
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "-q",
            "--allow-empty",
            "-m",
            message,
        ]);
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .current_dir(self.dir.path())
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}
