//! Git command execution wrapper.

use super::parser::{self, CommitSummary, LOG_FORMAT};
use super::MiningError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Read-only queries the miner needs from a version-control system.
///
/// Every call blocks until the underlying tool answers.
pub trait VersionControl: Send + Sync {
    /// All file paths reachable from `revision`, recursively.
    fn list_files(&self, revision: &str) -> Result<Vec<String>, MiningError>;

    /// Commits reachable from `revision`, newest first.
    fn full_log(&self, revision: &str) -> Result<Vec<CommitSummary>, MiningError>;

    /// Hashes of commits reachable from `revision` that touched `path`,
    /// newest first.
    fn log_for_path(&self, revision: &str, path: &str) -> Result<Vec<String>, MiningError>;

    /// Text content of `path` at `revision`.
    fn read_blob(&self, revision: &str, path: &str) -> Result<String, MiningError>;

    /// Canonical object id for a revision name.
    fn resolve(&self, name: &str) -> Result<String, MiningError>;
}

/// Wrapper for executing git commands.
pub struct GitExecutor {
    repo_path: PathBuf,
}

impl GitExecutor {
    /// Create a new git executor for the given repository path.
    pub fn new(repo_path: &Path) -> Result<Self, MiningError> {
        // Verify git is available
        let output = Command::new("git").arg("--version").output();
        match output {
            Ok(output) if output.status.success() => {}
            _ => return Err(MiningError::GitNotAvailable),
        }

        // Verify path is a git repository
        let output = Command::new("git")
            .current_dir(repo_path)
            .args(["rev-parse", "--git-dir"])
            .output()?;

        if !output.status.success() {
            return Err(MiningError::NotARepository(repo_path.to_path_buf()));
        }

        Ok(Self {
            repo_path: repo_path.to_path_buf(),
        })
    }

    /// Get repository root path.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Run git with `args` in the repository and return its raw stdout.
    fn output<I, S>(&self, args: I) -> Result<Vec<u8>, MiningError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(args)
            .output()?;
        Self::stdout(output)
    }

    /// Like [`Self::output`], but stdout must be valid UTF-8.
    fn run<I, S>(&self, args: I) -> Result<String, MiningError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        Ok(String::from_utf8(self.output(args)?)?)
    }

    /// Like [`Self::output`], decoding invalid UTF-8 lossily.
    ///
    /// Listings and logs may name files that are not UTF-8; those never
    /// match a descriptor name and must not fail the query.
    fn run_lossy<I, S>(&self, args: I) -> Result<String, MiningError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let stdout = self.output(args)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn stdout(output: Output) -> Result<Vec<u8>, MiningError> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MiningError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(output.stdout)
    }
}

impl VersionControl for GitExecutor {
    fn list_files(&self, revision: &str) -> Result<Vec<String>, MiningError> {
        tracing::trace!("Listing tree {}", revision);
        let output = self.run_lossy(["ls-tree", "-r", "-z", revision])?;
        let items = parser::parse_tree_output(&output)?;
        Ok(items.into_iter().map(|item| item.path).collect())
    }

    fn full_log(&self, revision: &str) -> Result<Vec<CommitSummary>, MiningError> {
        let format = format!("--format={}", LOG_FORMAT);
        let output = self.run_lossy(["log", format.as_str(), revision, "--"])?;
        parser::parse_log_output(&output)
    }

    fn log_for_path(&self, revision: &str, path: &str) -> Result<Vec<String>, MiningError> {
        // Paths are matched literally and renames are never followed,
        // whatever the user's log.follow setting.
        let output = self.run_lossy([
            "--literal-pathspecs",
            "-c",
            "log.follow=false",
            "log",
            "--format=%H",
            revision,
            "--",
            path,
        ])?;
        Ok(parser::parse_hash_lines(&output))
    }

    fn read_blob(&self, revision: &str, path: &str) -> Result<String, MiningError> {
        let object = format!("{}:{}", revision, path);
        self.run(["cat-file", "--textconv", object.as_str()])
    }

    fn resolve(&self, name: &str) -> Result<String, MiningError> {
        let output = self.run_lossy(["rev-parse", "--verify", name])?;
        Ok(output.trim().to_string())
    }
}
