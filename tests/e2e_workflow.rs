//! End-to-end workflow test
//!
//! Tests the complete workflow:
//! 1. Check a mod directory
//! 2. Apply with every answer given at the prompts
//! 3. Check again (already patched)
//! 4. Restore the backups

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const MERGED: &str = include_str!("fixtures/merged.ini.input");
const PATCHED: &str = include_str!("fixtures/merged.ini.expected");

/// Mod directory with two merged files and one disabled copy
fn setup_e2e_mods() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("RaidenShogun.ini"), MERGED).unwrap();
    fs::write(
        dir.path().join("Nahida.ini"),
        MERGED.replace("Raiden", "Nahida"),
    )
    .unwrap();
    fs::write(dir.path().join("DISABLED_Backup.ini"), MERGED).unwrap();
    dir
}

fn run_with_input(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_underwater-patcher"))
        .args(args)
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn check_json(dir: &Path) -> serde_json::Value {
    let output = run_with_input(&["check", "--dir", dir.to_str().unwrap(), "--json"], "");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_complete_workflow() {
    let dir = setup_e2e_mods();
    let mods = dir.path().to_str().unwrap();

    // Step 1: both merged files are valid, the disabled one is not listed
    let report = check_json(dir.path());
    let files = report.as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f["already_patched"] == false));
    assert_eq!(
        files[0]["report"]["texture_overrides"]["body"],
        "TextureOverrideNahidaShogunBody"
    );

    // Step 2: answer every question on stdin
    let answers = [
        "0",        // rejected: at least one outfit
        "1",        // outfit count
        "two",      // rejected: not a number
        "2",        // $swapvar value
        "VK_RIGHT", // toggle key
        "maybe",    // rejected: not y/n
        "n",        // global detection
        "y",        // underwater only
        "yes",      // shader patch
        "Y",        // game version 4.0+
        "no",       // revert
    ]
    .join("\n")
        + "\n";
    let output = run_with_input(&["apply", "--dir", mods], &answers);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("How many Underwater Outfits do you have?"));
    assert!(stdout.contains("Invalid input. Please enter a valid number."));
    assert!(stdout.contains("Invalid input. Please enter y/n."));
    assert!(stdout.contains("Successfully added 1 Underwater Outfits"));
    assert!(stdout.contains("Do you want to revert changes and restore backups?"));

    assert_eq!(
        fs::read_to_string(dir.path().join("RaidenShogun.ini")).unwrap(),
        PATCHED
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Nahida.ini")).unwrap(),
        PATCHED.replace("Raiden", "Nahida")
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("DISABLED_Backup.ini")).unwrap(),
        MERGED
    );
    assert!(!dir.path().join("DISABLED_Backup.ini.bak").exists());

    // Step 3: check sees the generated blocks
    let report = check_json(dir.path());
    assert!(report
        .as_array()
        .unwrap()
        .iter()
        .all(|f| f["already_patched"] == true));

    // Step 4: restore both files
    let output = run_with_input(&["restore", "--dir", mods], "");
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("RaidenShogun.ini")).unwrap(),
        MERGED
    );
    assert!(!dir.path().join("Nahida.ini.bak").exists());

    let report = check_json(dir.path());
    assert!(report
        .as_array()
        .unwrap()
        .iter()
        .all(|f| f["already_patched"] == false));
}

#[test]
fn test_interrupt_keeps_backups() {
    let dir = setup_e2e_mods();
    let mods = dir.path().to_str().unwrap();

    // Input ends at the revert question
    let answers = "1\n2\nVK_RIGHT\nn\nn\nn\n";
    let output = run_with_input(&["apply", "--dir", mods], answers);

    assert_eq!(output.status.code(), Some(130));
    assert!(dir.path().join("RaidenShogun.ini.bak").exists());
    assert!(dir.path().join("Nahida.ini.bak").exists());
}
