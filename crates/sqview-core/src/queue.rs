//! Slurm queue interface: `squeue`/`sacct` invocation and output parsing.
//!
//! Slurm is driven entirely through its CLI tools. `squeue` is asked for a
//! pipe-delimited listing of the caller's jobs; each row becomes a
//! [`JobRecord`]. The stdout/stderr columns hold the path *patterns* the
//! job was submitted with (`%A`, `%a`, `%j`, `%n` placeholders), which
//! expand to one log path per node.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail, ensure};
use tokio::process::Command;

/// Field list requested from squeue, pipe-separated.
pub const SQUEUE_FORMAT: &str = "JobID:|,ArrayJobID:|,ArrayTaskID:|,Partition:|,Name:|,State:|,\
                                 TimeUsed:|,NumNodes:|,Nodelist:|,STDOUT:|,STDERR:";

/// Number of columns in [`SQUEUE_FORMAT`].
const FIELD_COUNT: usize = 11;

/// Columns requested from sacct for the job detail view.
const SACCT_FORMAT: &str = "JobID,JobName,Partition,Account,AllocCPUS,ReqMem,AllocTRES,State,ExitCode";

/// One row of `squeue` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_id: String,
    pub array_job_id: String,
    pub array_task_id: String,
    pub partition: String,
    pub name: String,
    pub state: String,
    pub time_used: String,
    pub num_nodes: usize,
    pub nodelist: String,
    stdout_pattern: Option<String>,
    stderr_pattern: Option<String>,
}

impl JobRecord {
    pub fn is_running(&self) -> bool {
        self.state == "RUNNING"
    }

    /// Expanded stdout log paths, one per node.
    ///
    /// Empty when the job was submitted without `--output`.
    pub fn stdout_paths(&self) -> Vec<PathBuf> {
        self.stdout_pattern
            .as_deref()
            .map_or_else(Vec::new, |p| self.expand(p))
    }

    /// Expanded stderr log paths, one per node.
    pub fn stderr_paths(&self) -> Vec<PathBuf> {
        self.stderr_pattern
            .as_deref()
            .map_or_else(Vec::new, |p| self.expand(p))
    }

    /// Substitutes Slurm filename placeholders.
    ///
    /// `%n` (node index) multiplies the pattern out to one path per node;
    /// the remaining placeholders are scalar.
    fn expand(&self, pattern: &str) -> Vec<PathBuf> {
        let scalar = pattern
            .replace("%A", &self.array_job_id)
            .replace("%a", &self.array_task_id)
            .replace("%j", &self.job_id);
        if scalar.contains("%n") {
            (0..self.num_nodes.max(1))
                .map(|node| PathBuf::from(scalar.replace("%n", &node.to_string())))
                .collect()
        } else {
            vec![PathBuf::from(scalar)]
        }
    }
}

/// Parses the pipe-delimited output of [`SQUEUE_FORMAT`].
///
/// The first row is the header. A row with the wrong number of fields is
/// an error naming both counts, matching nothing silently.
pub fn parse_queue(output: &str) -> Result<Vec<JobRecord>> {
    let mut jobs = Vec::new();
    for (idx, row) in output.trim().lines().enumerate() {
        if idx == 0 {
            continue;
        }
        let row = row.trim();
        if row.is_empty() {
            continue;
        }
        let fields: Vec<&str> = row.split('|').map(str::trim).collect();
        ensure!(
            fields.len() == FIELD_COUNT,
            "expected {FIELD_COUNT} squeue fields, got {}: {row:?}",
            fields.len()
        );
        let num_nodes = fields[7]
            .parse()
            .with_context(|| format!("parse NumNodes {:?}", fields[7]))?;
        jobs.push(JobRecord {
            job_id: fields[0].to_string(),
            array_job_id: fields[1].to_string(),
            array_task_id: fields[2].to_string(),
            partition: fields[3].to_string(),
            name: fields[4].to_string(),
            state: fields[5].to_string(),
            time_used: fields[6].to_string(),
            num_nodes,
            nodelist: fields[8].to_string(),
            stdout_pattern: pattern_field(fields[9]),
            stderr_pattern: pattern_field(fields[10]),
        });
    }
    Ok(jobs)
}

/// `N/A` means the stream was not configured at submission.
fn pattern_field(field: &str) -> Option<String> {
    (field != "N/A" && !field.is_empty()).then(|| field.to_string())
}

/// Runs squeue (or the configured override) and parses the rows.
///
/// `queue_command` substitutes the whole command line, letting tests and
/// offline use feed fixture output through e.g. `cat queue.txt`.
pub async fn fetch_queue(queue_command: Option<&str>) -> Result<Vec<JobRecord>> {
    let command = queue_command
        .map(str::to_owned)
        .unwrap_or_else(|| format!("squeue --me --Format='{SQUEUE_FORMAT}'"));
    let output = run_shell(&command).await?;
    parse_queue(&output)
}

/// Runs `sacct` for the detail view of one job.
pub async fn job_detail(job_id: &str) -> Result<String> {
    // Array rows carry a `_0` suffix that sacct does not accept.
    let id = job_id.strip_suffix("_0").unwrap_or(job_id);
    run_shell(&format!("sacct -j {id} --format '{SACCT_FORMAT}'"))
        .await
        .context("run sacct")
}

/// Runs `squeue --job` for a single job id, returning the raw table.
pub async fn job_status(job_id: u64) -> Result<String> {
    run_shell(&format!("squeue --job {job_id}")).await
}

/// Runs a command under `sh -c` and returns its stdout.
///
/// Non-zero exit surfaces stderr in the error. TERM/NO_COLOR keep
/// well-behaved tools from emitting escape sequences into output we
/// parse.
async fn run_shell(command: &str) -> Result<String> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .env("TERM", "dumb")
        .env("NO_COLOR", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("spawn `{command}`"))?;
    if !output.status.success() {
        bail!(
            "`{command}` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
