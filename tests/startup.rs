use std::fs;
use std::process::Command;

#[cfg(target_os = "linux")]
#[test]
fn test_malformed_config_exits_with_status_one() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("config").join("pdfquiz");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "default_question_count = \"not a number\"\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_pdfquiz"))
        .current_dir(home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("HOME", home.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: failed to load config"), "{stderr}");
    assert!(!home.path().join("data").join("pdfquiz").join("test_generator.db").exists());
}
