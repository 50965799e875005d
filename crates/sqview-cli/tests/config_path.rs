use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_honors_sqview_home() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(home.path().to_str().unwrap()))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_writes_template_once() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    let contents = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
    assert!(contents.contains("buffer_size"));

    // A second init must refuse to overwrite.
    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let home = tempdir().unwrap();
    std::fs::create_dir_all(home.path()).unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        "buffer_size = 10\nscroll_buffer = 99\n",
    )
    .unwrap();

    cargo_bin_cmd!("sqview")
        .env("SQVIEW_HOME", home.path())
        .args(["config", "path"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scroll_buffer"));
}
