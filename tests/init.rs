use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_reckon"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "reckon init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".reckon.toml");
    assert!(config_path.exists(), ".reckon.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[git]"));
    assert!(content.contains("[engineer]"));

    // Verify it's valid TOML that reckon-core can parse
    let config: reckon_core::ReckonConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.git.window_months, 6);
    assert_eq!(config.engineer.baseline_loc_per_day, 80.0);
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".reckon.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_reckon"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}
