//! Git history mining for descriptor files.
//!
//! This module provides functionality to:
//! - Query a repository through a narrow version-control interface
//! - Parse `git ls-tree` and `git log` output
//! - Discover descriptor files lazily while walking the commit log
//! - Reconstruct each descriptor's revision history

mod error;
mod executor;
mod history;
mod miner;
mod parser;

#[cfg(test)]
pub(crate) mod testing;

pub use error::MiningError;
pub use executor::{GitExecutor, VersionControl};
pub use history::grab_revisions;
pub use miner::{
    is_descriptor, unit_directory, unit_id, DiscoveryWalk, GitMiner, MiningConfig, MiningReport,
    DESCRIPTOR_FILENAME, METADATA_FILENAME,
};
pub use parser::{
    parse_log_output, parse_tree_line, parse_tree_output, CommitSummary, ObjectType, TreeItem,
};
