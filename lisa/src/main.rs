//! Lisa entry point
//!
//! Builds the catalog for one repository and exits non-zero on any fatal
//! error.

use clap::Parser;
use lisa::MiningConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lisa")]
#[command(about = "Build a catalog of hash.json histories from a git repository")]
#[command(version)]
struct Args {
    /// Git repository directory
    #[arg(long)]
    repo: PathBuf,

    /// Output directory
    #[arg(long)]
    output: PathBuf,

    /// Empty the output directory before running
    #[arg(long)]
    clean_output: bool,

    /// Revision to mine from
    #[arg(long, default_value = "HEAD")]
    revision: String,

    /// Log every commit and file read
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_filter = if args.verbose { "lisa=debug" } else { "lisa=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = MiningConfig {
        revision: args.revision,
        ..MiningConfig::default()
    };

    match lisa::pipeline::run(&args.repo, &args.output, args.clean_output, config).await {
        Ok(report) => {
            tracing::info!(
                "Catalog for {} written to {}",
                report.head,
                args.output.display()
            );
        }
        Err(e) => {
            tracing::error!("Catalog generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["lisa", "--repo", "r", "--output", "o"]).unwrap();
        assert_eq!(args.repo, PathBuf::from("r"));
        assert_eq!(args.output, PathBuf::from("o"));
        assert!(!args.clean_output);
        assert_eq!(args.revision, "HEAD");
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_require_repo_and_output() {
        assert!(Args::try_parse_from(["lisa", "--repo", "r"]).is_err());
        assert!(Args::try_parse_from(["lisa", "--output", "o"]).is_err());
    }

    #[test]
    fn test_args_clean_output_flag() {
        let args =
            Args::try_parse_from(["lisa", "--repo", "r", "--output", "o", "--clean-output"])
                .unwrap();
        assert!(args.clean_output);
    }
}
