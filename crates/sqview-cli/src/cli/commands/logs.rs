//! `sqview logs` - print or follow the most recent job's logs.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqview_core::config::Config;
use sqview_core::{interrupt, logfind, queue};

pub async fn run(
    log_dir: Option<&str>,
    oldest: bool,
    follow_stdout: bool,
    follow_stderr: bool,
    config: &Config,
) -> Result<()> {
    let dir = log_dir
        .map(PathBuf::from)
        .or_else(|| config.effective_log_dir())
        .context("no log directory given and no log_dir configured")?;
    let logs = logfind::recent_job_logs(&dir, !oldest)?;
    println!("Showing Slurm job {}", logs.job_id);

    println!("STDOUT: {}", logs.stdout.display());
    if follow_stdout {
        follow(&logs.stdout).await?;
    } else {
        print_file(&logs.stdout);
    }
    println!();

    println!("STDERR: {}", logs.stderr.display());
    if follow_stderr {
        follow(&logs.stderr).await?;
    } else {
        print_file(&logs.stderr);
    }
    println!();

    println!("squeue --job {}", logs.job_id);
    match queue::job_status(logs.job_id).await {
        Ok(table) => print!("{table}"),
        Err(e) => eprintln!("{e:#}"),
    }
    Ok(())
}

fn print_file(path: &Path) {
    match std::fs::read_to_string(path) {
        Ok(contents) => print!("{contents}"),
        Err(e) => println!("(could not read {}: {e})", path.display()),
    }
}

/// Prints the file and keeps printing appended content until Ctrl+C.
async fn follow(path: &Path) -> Result<()> {
    let mut offset = 0;
    loop {
        offset = print_from(path, offset)?;
        if interrupt::is_interrupted() {
            return Err(interrupt::InterruptedError.into());
        }
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
}

/// Prints file content from `offset` on and returns the new offset.
/// A shrunken file (rotation) restarts from its current length.
fn print_from(path: &Path, offset: u64) -> Result<u64> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let len = file.metadata()?.len();
    if len <= offset {
        return Ok(len.min(offset));
    }
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    let mut stdout = std::io::stdout();
    stdout.write_all(&buf)?;
    stdout.flush()?;
    Ok(offset + buf.len() as u64)
}
