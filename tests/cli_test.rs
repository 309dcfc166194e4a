use std::path::Path;
use std::process::{Command, Output};

use hum_remover::audio::read_wav;
use serde_json::Value;
use tempfile::TempDir;

fn cli(workspace: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_hum_cli"));
    // Point at a config that does not exist so defaults apply
    command
        .arg("--config")
        .arg(workspace.path().join("absent_config.json"))
        .env_remove("HUM_REMOVER_CONFIG");
    command
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout UTF-8");
    serde_json::from_str(stdout.trim()).expect("JSON report on stdout")
}

fn synth(workspace: &TempDir, name: &str, fundamental: &str) -> String {
    let path = path_arg(&workspace.path().join(name));
    let output = cli(workspace)
        .args([
            "synth",
            &path,
            "--fundamental",
            fundamental,
            "--sample-rate",
            "16000",
            "--seconds",
            "2",
            "--channels",
            "2",
        ])
        .output()
        .expect("failed to run hum_cli synth");
    assert!(
        output.status.success(),
        "synth exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    path
}

#[test]
fn synth_then_detect_reports_fundamental() {
    let workspace = TempDir::new().expect("temp dir");
    let input = synth(&workspace, "hum50.wav", "50");

    let output = cli(&workspace)
        .args(["detect", &input])
        .output()
        .expect("failed to run hum_cli detect");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["frequency"], 50.0);
    assert_eq!(json["confident"], true);
    assert_eq!(json["candidates"].as_array().map(Vec::len), Some(2));
}

#[test]
fn process_writes_cleaned_wav_and_report() {
    let workspace = TempDir::new().expect("temp dir");
    let input = synth(&workspace, "hum60.wav", "60");
    let cleaned = workspace.path().join("cleaned.wav");
    let report = workspace.path().join("report.json");

    let output = cli(&workspace)
        .args([
            "process",
            &input,
            &path_arg(&cleaned),
            "--frequency",
            "auto",
            "--harmonics",
            "3",
            "--report",
            &path_arg(&report),
        ])
        .output()
        .expect("failed to run hum_cli process");
    assert!(
        output.status.success(),
        "process exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let json = stdout_json(&output);
    assert_eq!(json["resolvedFrequency"], 60.0);
    assert_eq!(json["autoDetected"], true);
    assert_eq!(
        json["harmonicsApplied"],
        serde_json::json!([60.0, 120.0, 180.0])
    );

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report file"))
            .expect("report JSON");
    assert_eq!(saved, json);

    let buffer = read_wav(&cleaned).expect("cleaned wav");
    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.frames(), 32_000);
    assert_eq!(buffer.sample_rate(), 16_000);
}

#[test]
fn design_prints_normalized_coefficients() {
    let workspace = TempDir::new().expect("temp dir");
    let output = cli(&workspace)
        .args([
            "design",
            "--frequency",
            "60",
            "--sample-rate",
            "300",
            "--harmonics",
            "3",
        ])
        .output()
        .expect("failed to run hum_cli design");
    assert!(output.status.success());

    let json = stdout_json(&output);
    let filters = json["filters"].as_array().expect("filters array");
    assert_eq!(filters.len(), 2);
    assert_eq!(filters[0]["a0"], 1.0);
    assert_eq!(filters[0]["b0"], filters[0]["b2"]);
    assert_eq!(json["skipped"], serde_json::json!([180.0]));
}

#[test]
fn design_rejects_frequency_above_nyquist() {
    let workspace = TempDir::new().expect("temp dir");
    let output = cli(&workspace)
        .args(["design", "--frequency", "5000", "--sample-rate", "8000"])
        .output()
        .expect("failed to run hum_cli design");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_input_exits_with_error() {
    let workspace = TempDir::new().expect("temp dir");
    let missing = path_arg(&workspace.path().join("missing.wav"));
    let output = cli(&workspace)
        .args(["process", &missing, &path_arg(&workspace.path().join("out.wav"))])
        .output()
        .expect("failed to run hum_cli process");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("reading"), "stderr was {stderr}");
}

#[test]
fn invalid_frequency_argument_is_rejected() {
    let workspace = TempDir::new().expect("temp dir");
    let input = synth(&workspace, "hum.wav", "60");
    let output = cli(&workspace)
        .args([
            "process",
            &input,
            &path_arg(&workspace.path().join("out.wav")),
            "--frequency",
            "mains",
        ])
        .output()
        .expect("failed to run hum_cli process");

    assert!(!output.status.success());
}

#[test]
fn process_rejects_harmonic_count_above_limit() {
    let workspace = TempDir::new().expect("temp dir");
    let input = synth(&workspace, "hum.wav", "60");
    let output = cli(&workspace)
        .args([
            "process",
            &input,
            &path_arg(&workspace.path().join("out.wav")),
            "--harmonics",
            "4294967295",
        ])
        .output()
        .expect("failed to run hum_cli process");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("harmonics must be between 1 and 5"),
        "stderr was {stderr}"
    );
    assert!(!workspace.path().join("out.wav").exists());
}

#[test]
fn synth_accepts_largest_seed_on_several_channels() {
    let workspace = TempDir::new().expect("temp dir");
    let path = path_arg(&workspace.path().join("seeded.wav"));
    let output = cli(&workspace)
        .args([
            "synth",
            &path,
            "--seconds",
            "0.1",
            "--channels",
            "2",
            "--seed",
            "18446744073709551615",
        ])
        .output()
        .expect("failed to run hum_cli synth");

    assert!(output.status.success());
    assert_eq!(read_wav(Path::new(&path)).expect("seeded wav").channel_count(), 2);
}
