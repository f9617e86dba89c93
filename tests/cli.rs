use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn presets_json() -> &'static str {
    r#"
[
  { "name": "Opening", "config": { "mode": "countdown", "durationSec": 300 } },
  { "name": "Broken", "config": 7 },
  { "name": "Q&A", "config": { "mode": "countup" }, "linkedToNext": true }
]
"#
}

#[test]
fn parse_applies_blur_normalization() {
    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.args(["parse", "530"])
        .assert()
        .success()
        .stdout("00:05:30\n");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.args(["parse", "1:99:99"])
        .assert()
        .success()
        .stdout("02:40:39\n");
}

#[test]
fn edit_replays_digit_entry() {
    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.args(["edit", "--value", "00:00:00", "--cursor", "0", "1", "2"])
        .assert()
        .success()
        .stdout("12:00:00 3 3\n");
}

#[test]
fn validate_sanitizes_config_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"mode": "tod", "durationSec": -5, "format": "bogus"}"#)
        .expect("write config");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"tod\""))
        .stdout(predicate::str::contains("\"durationSec\": 1200"))
        .stdout(predicate::str::contains("\"format\": \"MM:SS\""));
}

#[test]
fn validate_reads_stdin_and_rejects_scalars() {
    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("validate")
        .write_stdin("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a JSON object"));
}

#[test]
fn malformed_json_fails_with_clear_error() {
    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("validate")
        .write_stdin("{ not-valid-json ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn import_keeps_valid_presets_and_lists_them() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("presets.json");
    let import = dir.path().join("import.json");
    fs::write(&import, presets_json()).expect("write import");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["presets", "import"])
        .arg(&import)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 presets"));

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["presets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opening\tcountdown\t0:05:00"))
        .stdout(predicate::str::contains("Q&A\tcountup\t0:20:00 ->"))
        .stdout(predicate::str::contains("Broken").not());
}

#[test]
fn import_rejects_non_array() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("presets.json");
    let import = dir.path().join("import.json");
    fs::write(&import, r#"{"name": "Solo", "config": {}}"#).expect("write import");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["presets", "import"])
        .arg(&import)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a JSON array"));
    assert!(!store.exists());
}

#[test]
fn send_prints_frame_for_saved_preset() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("presets.json");
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"durationSec": 90, "format": "SS"}"#).expect("write config");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["presets", "save", "Short", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout("saved preset 0\n");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["send", "start", "--preset", "Short"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"{"type":"TIMER_UPDATE","payload":{"command":"start""#))
        .stdout(predicate::str::contains(r#""durationSec":90"#));

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["preview", "--preset", "Short"])
        .assert()
        .success()
        .stdout("90\n");
}

#[test]
fn send_with_unknown_preset_fails() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("presets.json");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["send", "pause", "--preset", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no preset named 'Nope'"));
}

#[test]
fn receive_applies_each_distinct_frame_once() {
    let start = r#"{"type":"TIMER_UPDATE","payload":{"command":"start","config":{"durationSec":90,"format":"SS"}}}"#;
    let pause = r#"{"type":"TIMER_UPDATE","payload":{"command":"pause","config":{"durationSec":90,"format":"SS"}}}"#;
    let input = format!("{start}\n{start}\nnot a frame\n\n{pause}\n");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("receive")
        .write_stdin(input)
        .assert()
        .success()
        .stdout("running 90\npaused 90\n");
}

#[test]
fn open_resets_surface_to_current_form() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("presets.json");
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"durationSec": 90, "format": "SS"}"#).expect("write config");

    let mut cmd = cargo_bin_cmd!("hawktimer");
    cmd.arg("--store")
        .arg(&store)
        .args(["open", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout("idle 90\n");
}
