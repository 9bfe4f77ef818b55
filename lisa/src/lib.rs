//! Lisa: git history catalog builder
//!
//! Walks the full commit history of a repository, finds every directory that
//! ever held a `hash.json` descriptor, and writes the complete revision history
//! of each descriptor as a JSON catalog.

pub mod catalog;
pub mod git_mining;
pub mod pipeline;

pub use catalog::{CatalogWriter, EmitIndex, HashRevision, Metadata, ModUnitInfo};
pub use git_mining::{GitMiner, MiningConfig, MiningError, MiningReport};
