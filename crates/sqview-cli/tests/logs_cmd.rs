use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn seed_job(dir: &std::path::Path, job_id: u64, stdout: &str, stderr: &str) {
    std::fs::write(dir.join(format!("{job_id}_submission.sh")), "#!/bin/sh\n").unwrap();
    std::fs::write(dir.join(format!("{job_id}_0_log.out")), stdout).unwrap();
    std::fs::write(dir.join(format!("{job_id}_0_log.err")), stderr).unwrap();
}

#[test]
fn test_logs_prints_newest_job() {
    let home = tempdir().unwrap();
    let logs = tempdir().unwrap();
    seed_job(logs.path(), 100, "old stdout\n", "old stderr\n");
    seed_job(logs.path(), 250, "epoch 1 done\n", "warning: slow io\n");

    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .args(["logs", logs.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing Slurm job 250"))
        .stdout(predicate::str::contains("epoch 1 done"))
        .stdout(predicate::str::contains("warning: slow io"))
        .stdout(predicate::str::contains("old stdout").not());
}

#[test]
fn test_logs_oldest_flag() {
    let home = tempdir().unwrap();
    let logs = tempdir().unwrap();
    seed_job(logs.path(), 100, "old stdout\n", "");
    seed_job(logs.path(), 250, "new stdout\n", "");

    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .args(["logs", logs.path().to_str().unwrap(), "--oldest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing Slurm job 100"))
        .stdout(predicate::str::contains("old stdout"));
}

#[test]
fn test_logs_errors_without_directory() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .env_remove("SLURM_DASHBOARD_DIR")
        .arg("logs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no log directory"));
}

#[test]
fn test_logs_errors_on_empty_directory() {
    let home = tempdir().unwrap();
    let logs = tempdir().unwrap();
    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .args(["logs", logs.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no *_submission.sh"));
}
