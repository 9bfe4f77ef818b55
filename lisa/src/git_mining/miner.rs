//! Git history miner that builds the unit catalog.

use super::{executor::GitExecutor, history, CommitSummary, MiningError, VersionControl};
use crate::catalog::{self, CatalogWriter, EmitIndex, Metadata, ModUnitInfo};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use xxhash_rust::xxh32::xxh32;

/// File name that marks a directory as a unit.
pub const DESCRIPTOR_FILENAME: &str = "hash.json";
/// File name of the catalog root document.
pub const METADATA_FILENAME: &str = "_metadata.json";

/// Configuration for git mining operations.
#[derive(Debug, Clone)]
pub struct MiningConfig {
    /// Base name of descriptor files.
    pub descriptor_name: String,
    /// Revision treated as head.
    pub revision: String,
    /// File name of the metadata document in the output directory.
    pub metadata_name: String,
    /// Grace period before the output directory is emptied.
    pub clean_delay: Duration,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            descriptor_name: DESCRIPTOR_FILENAME.to_string(),
            revision: "HEAD".to_string(),
            metadata_name: METADATA_FILENAME.to_string(),
            clean_delay: Duration::from_secs(5),
        }
    }
}

/// Result of a mining operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MiningReport {
    /// Resolved head commit.
    pub head: String,
    /// Number of commits walked.
    pub commits_processed: usize,
    /// Number of distinct descriptor paths found across history.
    pub descriptors_discovered: usize,
    /// Number of unit files written.
    pub units_written: usize,
    /// Descriptors at the repository root, excluded from the catalog.
    pub units_skipped: usize,
    /// Revisions recorded with null content.
    pub unreadable_revisions: usize,
}

/// Lazy descriptor discovery over a commit walk.
///
/// A path is reported the first time it is observed and never again.
#[derive(Debug)]
pub struct DiscoveryWalk {
    descriptor_name: String,
    discovered: HashSet<String>,
}

impl DiscoveryWalk {
    /// Start a walk that reports files named `descriptor_name`.
    pub fn new(descriptor_name: impl Into<String>) -> Self {
        Self {
            descriptor_name: descriptor_name.into(),
            discovered: HashSet::new(),
        }
    }

    /// Record the files of one commit and return descriptors not seen before,
    /// in listing order.
    pub fn observe(&mut self, files: Vec<String>) -> Vec<String> {
        files
            .into_iter()
            .filter(|path| is_descriptor(path, &self.descriptor_name))
            .filter(|path| self.discovered.insert(path.clone()))
            .collect()
    }

    /// Every descriptor path reported so far.
    pub fn discovered(&self) -> &HashSet<String> {
        &self.discovered
    }
}

/// Whether the last segment of `path` is `descriptor_name`.
pub fn is_descriptor(path: &str, descriptor_name: &str) -> bool {
    path.rsplit('/').next() == Some(descriptor_name)
}

/// Directory containing a descriptor, or `None` at the repository root.
pub fn unit_directory(descriptor_path: &str) -> Option<&str> {
    descriptor_path
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
}

/// Catalog id: `<basename>-<xxh32(unit path) in hex>`.
pub fn unit_id(unit_path: &str) -> String {
    let name = unit_path.rsplit('/').next().unwrap_or(unit_path);
    format!("{}-{:x}", name, xxh32(unit_path.as_bytes(), 0))
}

/// Outcome of one extraction task.
struct UnitOutcome {
    entry: EmitIndex,
    unreadable: usize,
}

/// Git history miner that reconstructs descriptor histories.
pub struct GitMiner<G = GitExecutor> {
    gateway: Arc<G>,
    config: MiningConfig,
}

impl GitMiner<GitExecutor> {
    /// Create a new git miner for the given repository.
    pub fn new(repo_path: &Path, config: MiningConfig) -> Result<Self, MiningError> {
        let executor = GitExecutor::new(repo_path)?;
        Ok(Self::with_gateway(executor, config))
    }
}

impl<G> GitMiner<G>
where
    G: VersionControl + 'static,
{
    /// Create a miner over any version-control gateway.
    pub fn with_gateway(gateway: G, config: MiningConfig) -> Self {
        Self {
            gateway: Arc::new(gateway),
            config,
        }
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Walk the full history, write one file per unit and the metadata
    /// document.
    ///
    /// Commits are listed one at a time in log order. Each newly discovered
    /// descriptor is extracted and written on its own task; the metadata is
    /// written only after every task has finished.
    pub async fn mine(&self, writer: &CatalogWriter) -> Result<MiningReport, MiningError> {
        let revision = self.config.revision.clone();
        let head = self.blocking(move |git| git.resolve(&revision)).await?;
        let commits = self.commits(&head).await?;
        let in_head = Arc::new(self.descriptors_at(&head).await?);

        tracing::info!("Walking {} commits from {}", commits.len(), head);

        let mut report = MiningReport {
            head: head.clone(),
            commits_processed: commits.len(),
            ..MiningReport::default()
        };
        let mut walk = DiscoveryWalk::new(self.config.descriptor_name.clone());
        let mut tasks = JoinSet::new();

        for commit in &commits {
            tracing::debug!("Processing commit {}", commit.hash);
            let hash = commit.hash.clone();
            let files = self.blocking(move |git| git.list_files(&hash)).await?;

            for path in walk.observe(files) {
                tracing::info!("Discovered {}", path);
                tasks.spawn(Self::process_unit(
                    Arc::clone(&self.gateway),
                    writer.clone(),
                    Arc::clone(&in_head),
                    commit.hash.clone(),
                    path,
                ));
            }
        }
        report.descriptors_discovered = walk.discovered().len();

        let mut index = Vec::with_capacity(report.descriptors_discovered);
        while let Some(joined) = tasks.join_next().await {
            match joined?? {
                Some(outcome) => {
                    report.units_written += 1;
                    report.unreadable_revisions += outcome.unreadable;
                    index.push(outcome.entry);
                }
                None => report.units_skipped += 1,
            }
        }
        tracing::info!("Wrote {} unit files", report.units_written);

        catalog::sort_index(&mut index);
        writer
            .write_metadata(&Metadata {
                head,
                commits,
                index,
            })
            .await?;

        tracing::info!(
            "Mining complete: {} units from {} commits ({} skipped, {} unreadable revisions)",
            report.units_written,
            report.commits_processed,
            report.units_skipped,
            report.unreadable_revisions
        );

        Ok(report)
    }

    /// Full commit log of `head`, newest first.
    async fn commits(&self, head: &str) -> Result<Vec<CommitSummary>, MiningError> {
        let head = head.to_string();
        self.blocking(move |git| git.full_log(&head)).await
    }

    /// Descriptor paths present in `head`.
    async fn descriptors_at(&self, head: &str) -> Result<HashSet<String>, MiningError> {
        let head = head.to_string();
        let files = self.blocking(move |git| git.list_files(&head)).await?;
        Ok(files
            .into_iter()
            .filter(|path| is_descriptor(path, &self.config.descriptor_name))
            .collect())
    }

    /// Extract and write one unit. Returns `None` for root-level descriptors.
    async fn process_unit(
        gateway: Arc<G>,
        writer: CatalogWriter,
        in_head: Arc<HashSet<String>>,
        commit: String,
        path: String,
    ) -> Result<Option<UnitOutcome>, MiningError> {
        let revisions = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || {
                history::grab_revisions(gateway.as_ref(), &commit, &path)
            })
            .await??
        };

        let Some(unit_path) = unit_directory(&path) else {
            tracing::warn!("Ignoring descriptor outside a unit directory: {}", path);
            return Ok(None);
        };

        let id = unit_id(unit_path);
        let unit = ModUnitInfo {
            path: unit_path.to_string(),
            seen_in_head: in_head.contains(&path),
            revisions,
        };
        let unreadable = unit.revisions.iter().filter(|r| r.content.is_none()).count();

        writer.write_unit(&id, &unit).await?;

        Ok(Some(UnitOutcome {
            entry: EmitIndex {
                id,
                display_name: unit.path,
            },
            unreadable,
        }))
    }

    /// Run a gateway query on the blocking pool.
    async fn blocking<T, F>(&self, query: F) -> Result<T, MiningError>
    where
        T: Send + 'static,
        F: FnOnce(&G) -> Result<T, MiningError> + Send + 'static,
    {
        let gateway = Arc::clone(&self.gateway);
        tokio::task::spawn_blocking(move || query(gateway.as_ref())).await?
    }
}
