//! End-to-end catalog generation for one repository.

use crate::catalog::CatalogWriter;
use crate::git_mining::{GitMiner, MiningConfig, MiningError, MiningReport};
use std::path::Path;

/// Mine `repo` and write the catalog into `output`.
///
/// The repository is checked before the output directory is touched. With
/// `clean_output` the directory is emptied after `config.clean_delay`.
pub async fn run(
    repo: &Path,
    output: &Path,
    clean_output: bool,
    config: MiningConfig,
) -> Result<MiningReport, MiningError> {
    let miner = GitMiner::new(repo, config)?;
    let config = miner.config();

    let writer = CatalogWriter::new(output, config.metadata_name.as_str());
    writer.prepare(clean_output, config.clean_delay).await?;

    tracing::info!(
        "Building catalog of {} into {}",
        repo.display(),
        output.display()
    );
    miner.mine(&writer).await
}
