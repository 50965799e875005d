//! Experiment snapshots: copy the working tree aside and run there.
//!
//! On shared filesystems a long-running job should not see edits made
//! after submission. `snapshot` copies the current directory into
//! `<base_dir>/experiment_<id>` (excluding configured globs) and executes
//! the given command from inside the copy, isolating it from further
//! changes to the source tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rand::Rng;
use tracing::info;

/// Experiment ids are drawn from this range when not given explicitly.
const MIN_EXPERIMENT_ID: u64 = 200_000;
const MAX_EXPERIMENT_ID: u64 = 300_000;

pub const DEFAULT_BASE_DIR: &str = "snapshotted_experiments";

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub base_dir: PathBuf,
    /// Fixed experiment id; random when `None`.
    pub experiment_id: Option<u64>,
    /// Basename globs to skip while copying (e.g. `target`, `*.ckpt`).
    pub exclude: Vec<String>,
    /// Report what would happen without copying or running anything.
    pub dry_run: bool,
}

/// Copies the current directory into a fresh experiment directory and
/// runs `command` there. Returns the experiment directory.
pub async fn run(command: &str, opts: &SnapshotOptions) -> Result<PathBuf> {
    ensure!(!command.trim().is_empty(), "command cannot be empty");
    let source = std::env::current_dir().context("resolve current directory")?;
    let id = opts
        .experiment_id
        .unwrap_or_else(|| rand::thread_rng().gen_range(MIN_EXPERIMENT_ID..MAX_EXPERIMENT_ID));
    // Absolute destination so the self-copy guard in copy_tree holds even
    // for a base dir nested inside the source tree.
    let base_dir = if opts.base_dir.is_absolute() {
        opts.base_dir.clone()
    } else {
        source.join(&opts.base_dir)
    };
    let experiment_dir = base_dir.join(format!("experiment_{id}"));

    info!(
        source = %source.display(),
        dest = %experiment_dir.display(),
        exclude = ?opts.exclude,
        dry_run = opts.dry_run,
        "snapshotting working tree"
    );
    if opts.dry_run {
        return Ok(experiment_dir);
    }

    if experiment_dir.exists() {
        info!(dest = %experiment_dir.display(), "removing stale experiment directory");
        std::fs::remove_dir_all(&experiment_dir)
            .with_context(|| format!("remove {}", experiment_dir.display()))?;
    }
    copy_tree(&source, &experiment_dir, &opts.exclude)?;

    info!(command, dir = %experiment_dir.display(), "running snapshotted command");
    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(&experiment_dir)
        .status()
        .await
        .with_context(|| format!("spawn `{command}`"))?;
    if !status.success() {
        bail!("`{command}` exited with {status}");
    }
    Ok(experiment_dir)
}

/// Recursively copies `source` into `dest`, skipping entries whose file
/// name matches an exclude glob. The destination itself is always
/// skipped so a base dir nested inside the source cannot recurse.
pub fn copy_tree(source: &Path, dest: &Path, exclude: &[String]) -> Result<()> {
    let excludes = build_globset(exclude)?;
    std::fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;

    let walk = WalkBuilder::new(source)
        .standard_filters(false)
        .hidden(false)
        .filter_entry({
            let excludes = excludes.clone();
            let dest = dest.to_path_buf();
            move |entry| {
                if entry.path().starts_with(&dest) {
                    return false;
                }
                entry
                    .path()
                    .file_name()
                    .is_none_or(|name| !excludes.is_match(Path::new(name)))
            }
        })
        .build();

    for entry in walk {
        let entry = entry.context("walk working tree")?;
        let path = entry.path();
        let relative = path.strip_prefix(source).expect("walk stays under source");
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(relative);
        if entry.file_type().is_some_and(|t| t.is_dir()) {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("create {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            std::fs::copy(path, &target)
                .with_context(|| format!("copy {} to {}", path.display(), target.display()))?;
        }
    }
    Ok(())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("bad exclude glob {pattern:?}"))?);
    }
    builder.build().context("build exclude globset")
}
