//! Locating job logs in a submission directory.
//!
//! Submission scripts are written as `<job_id>_submission.sh` next to the
//! `<job_id>_<array_id>_log.out` / `.err` files, so the directory listing
//! is enough to find the most recent job without asking Slurm.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Resolved log paths for one job (array index 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLogs {
    pub job_id: u64,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

/// Job ids that have a `*_submission.sh` in the directory, unsorted.
pub fn submission_ids(log_dir: &Path) -> Result<Vec<u64>> {
    let entries = std::fs::read_dir(log_dir)
        .with_context(|| format!("read log directory {}", log_dir.display()))?;
    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(prefix) = name.strip_suffix("_submission.sh") else {
            continue;
        };
        if let Ok(id) = prefix.parse() {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Log paths for the newest (or oldest) submitted job in the directory.
pub fn recent_job_logs(log_dir: &Path, newest: bool) -> Result<JobLogs> {
    let mut ids = submission_ids(log_dir)?;
    if ids.is_empty() {
        bail!("no *_submission.sh scripts in {}", log_dir.display());
    }
    ids.sort_unstable();
    let job_id = if newest { ids[ids.len() - 1] } else { ids[0] };
    let array_id = 0;
    Ok(JobLogs {
        job_id,
        stdout: log_dir.join(format!("{job_id}_{array_id}_log.out")),
        stderr: log_dir.join(format!("{job_id}_{array_id}_log.err")),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn finds_submission_ids() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "100_submission.sh");
        touch(dir.path(), "250_submission.sh");
        touch(dir.path(), "250_0_log.out");
        touch(dir.path(), "notes.txt");

        let mut ids = submission_ids(dir.path()).unwrap();
        ids.sort_unstable();
        assert_eq!(ids, [100, 250]);
    }

    #[test]
    fn picks_newest_job_by_default() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "100_submission.sh");
        touch(dir.path(), "250_submission.sh");

        let logs = recent_job_logs(dir.path(), true).unwrap();
        assert_eq!(logs.job_id, 250);
        assert_eq!(logs.stdout, dir.path().join("250_0_log.out"));
        assert_eq!(logs.stderr, dir.path().join("250_0_log.err"));

        let oldest = recent_job_logs(dir.path(), false).unwrap();
        assert_eq!(oldest.job_id, 100);
    }

    #[test]
    fn errors_when_no_submissions_exist() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "readme.md");
        let err = recent_job_logs(dir.path(), true).unwrap_err();
        assert!(err.to_string().contains("no *_submission.sh"));
    }
}
