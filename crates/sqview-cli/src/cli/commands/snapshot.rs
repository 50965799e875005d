//! `sqview snapshot` - isolate an experiment run from further edits.

use std::path::PathBuf;

use anyhow::Result;
use sqview_core::config::Config;
use sqview_core::snapshot::{self, SnapshotOptions};

pub async fn run(
    command: &str,
    exclude: Vec<String>,
    base_dir: Option<&str>,
    experiment_id: Option<u64>,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let exclude = if exclude.is_empty() {
        config.snapshot.exclude.clone()
    } else {
        exclude
    };
    let base_dir = PathBuf::from(
        base_dir
            .map(str::to_owned)
            .unwrap_or_else(|| config.snapshot.base_dir.clone()),
    );

    if dry_run {
        println!("Dry run: no changes will be made");
    }
    let opts = SnapshotOptions {
        base_dir,
        experiment_id,
        exclude,
        dry_run,
    };
    let dir = snapshot::run(command, &opts).await?;
    println!("Snapshot directory: {}", dir.display());
    Ok(())
}
