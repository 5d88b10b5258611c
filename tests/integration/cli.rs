//! Integration tests for the cloud-save binary

use assert_cmd::Command;

#[test]
fn test_help_lists_commands() {
    let output = Command::cargo_bin("cloud-save")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["keys", "load", "save", "delete", "query", "files"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_files_help() {
    let output = Command::cargo_bin("cloud-save")
        .unwrap()
        .args(["files", "--help"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("upload"));
    assert!(stdout.contains("download"));
}

#[test]
fn test_missing_project_fails_before_network() {
    Command::cargo_bin("cloud-save")
        .unwrap()
        .env_remove("CLOUD_SAVE_PROJECT_ID")
        .env_remove("CLOUD_SAVE_PLAYER_ID")
        .env_remove("CLOUD_SAVE_ACCESS_TOKEN")
        .env_remove("CLOUD_SAVE_BASE_URL")
        .env_remove("CLOUD_SAVE_ENVIRONMENT")
        .arg("keys")
        .assert()
        .failure();
}

#[test]
fn test_rejects_malformed_save_item() {
    Command::cargo_bin("cloud-save")
        .unwrap()
        .args(["save", "no-equals-sign"])
        .assert()
        .failure();
}
