//! Per-descriptor revision history extraction.

use super::{MiningError, VersionControl};
use crate::catalog::HashRevision;
use serde_json::Value;

/// Collect every revision of `path` reachable from `revision`.
///
/// Revisions keep the newest-first order of the path log. A revision whose
/// blob cannot be read or parsed is kept with `content: None`. Only a failure
/// to list the revisions at all is returned as an error.
pub fn grab_revisions<G>(
    gateway: &G,
    revision: &str,
    path: &str,
) -> Result<Vec<HashRevision>, MiningError>
where
    G: VersionControl + ?Sized,
{
    tracing::debug!("Fetching history of {} at {}", path, revision);
    let hashes = gateway.log_for_path(revision, path)?;

    let revisions = hashes
        .into_iter()
        .map(|hash| match read_content(gateway, &hash, path) {
            Ok(content) => HashRevision {
                hash,
                content: Some(content),
            },
            Err(e) => {
                tracing::warn!("Failed to read {} at {}: {}", path, hash, e);
                HashRevision::unreadable(hash)
            }
        })
        .collect();

    Ok(revisions)
}

fn read_content<G>(gateway: &G, hash: &str, path: &str) -> Result<Value, MiningError>
where
    G: VersionControl + ?Sized,
{
    tracing::trace!("Reading {} at {}", path, hash);
    let text = gateway.read_blob(hash, path)?;
    serde_json::from_str(&text).map_err(MiningError::Parse)
}
