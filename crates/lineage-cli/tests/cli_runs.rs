use std::path::{Path, PathBuf};
use std::process::Command;

fn lineage() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lineage"))
}

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lineage_cli_{label}_{}", uuid::Uuid::new_v4()))
}

fn generate(run_dir: &Path, extra: &[&str]) -> PathBuf {
    let output = lineage()
        .args(["generate", "--seed", "11", "--ftdl", "2", "--spdl", "1", "--run-dir"])
        .arg(run_dir)
        .args(extra)
        .output()
        .expect("spawn lineage generate");
    assert!(
        output.status.success(),
        "generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    PathBuf::from(String::from_utf8_lossy(&output.stdout).trim())
}

#[test]
fn generate_writes_run_artifacts() {
    let run_dir = temp_dir("generate");
    let copy = run_dir.join("copies").join("tree.json");
    let run_root = generate(&run_dir, &["--out", copy.to_str().expect("utf8 path")]);

    for artifact in [
        "config.json",
        "logs.ndjson",
        "resolved_config.json",
        "family_tree.json",
        "generation_report.json",
    ] {
        assert!(run_root.join(artifact).exists(), "missing {artifact}");
    }
    assert_eq!(
        std::fs::read(run_root.join("family_tree.json")).expect("tree"),
        std::fs::read(&copy).expect("copy")
    );

    let config: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(run_root.join("config.json")).expect("config.json"),
    )
    .expect("parse config.json");
    assert_eq!(config["config"]["seed"], 11);
    assert_eq!(config["config"]["tree_depth_limit"], 2);
    assert_eq!(config["reference"], "bundled");

    let logs = std::fs::read_to_string(run_root.join("logs.ndjson")).expect("logs");
    assert!(logs.lines().any(|line| line.contains("run_finished")));

    std::fs::remove_dir_all(&run_dir).ok();
}

#[test]
fn evaluate_reports_clean_run() {
    let run_dir = temp_dir("evaluate");
    let run_root = generate(&run_dir, &[]);

    let output = lineage()
        .arg("evaluate")
        .arg(run_root.join("family_tree.json"))
        .args(["--strict", "--write-violations"])
        .output()
        .expect("spawn lineage evaluate");
    assert!(
        output.status.success(),
        "evaluate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(run_root.join("metrics.json").exists());
    assert!(run_root.join("report.md").exists());
    assert!(run_root.join("violations.json").exists());

    std::fs::remove_dir_all(&run_dir).ok();
}

#[test]
fn config_file_values_are_overridden_by_flags() {
    let run_dir = temp_dir("config");
    std::fs::create_dir_all(&run_dir).expect("create dir");
    let config_path = run_dir.join("lineage.toml");
    std::fs::write(&config_path, "seed = 3\npartner_probability = 0.2\n").expect("write toml");

    let run_root = generate(&run_dir, &["--config", config_path.to_str().expect("utf8 path")]);
    let resolved: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(run_root.join("resolved_config.json")).expect("resolved"),
    )
    .expect("parse resolved config");
    assert_eq!(resolved["seed"], 11);
    assert_eq!(resolved["partner_probability"], 0.2);

    std::fs::remove_dir_all(&run_dir).ok();
}

#[test]
fn invalid_probability_fails() {
    let run_dir = temp_dir("invalid");
    let output = lineage()
        .args(["generate", "--pcp", "1.5", "--run-dir"])
        .arg(&run_dir)
        .output()
        .expect("spawn lineage generate");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("partner_probability"));
    std::fs::remove_dir_all(&run_dir).ok();
}

#[test]
fn schema_describes_document() {
    let output = lineage().arg("schema").output().expect("spawn lineage schema");
    assert!(output.status.success());
    let schema: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("schema is json");
    assert!(schema["properties"]["people"].is_object());
    assert!(schema["properties"]["meta"].is_object());
}
