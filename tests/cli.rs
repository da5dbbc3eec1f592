//! Binary-level behavior that needs no network.

use std::process::Command;

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_preimage-upload"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_no_argument_prints_usage() {
    let output = bin().output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn test_missing_key_is_fatal() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let output = bin()
        .arg(file.path())
        .env_remove("PREIMAGE_UPLOAD_PRIVATE_KEY")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PREIMAGE_UPLOAD_PRIVATE_KEY"));
}

#[test]
fn test_unreadable_file_is_input_error() {
    let output = bin()
        .arg("/nonexistent/preimage.bin")
        .env("PREIMAGE_UPLOAD_PRIVATE_KEY", common_key())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading file"));
}

#[test]
fn test_invalid_config_override() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let output = bin()
        .arg(file.path())
        .args(["--chain-id", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("network.chain_id"));
}

#[test]
fn test_verify_help_names_hash_scheme() {
    let output = bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--verify"));
    assert!(stdout.contains("flat keccak256"));
}

fn common_key() -> &'static str {
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
}
