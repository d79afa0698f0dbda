use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("argot-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn argot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argot"))
}

fn write_schema(dir: &PathBuf) -> PathBuf {
    let schema = r#"[
  { "name": "input", "position": 0, "required": true },
  { "name": "level", "value-kind": "int" },
  { "name": "verbose", "arity": "switch", "value-kind": "bool", "short": "v" }
]"#;
    let path = dir.join("schema.json");
    fs::write(&path, schema).expect("failed to write schema");
    path
}

#[test]
fn binds_tokens_and_prints_json() {
    let dir = make_temp_dir("bind");
    let schema = write_schema(&dir);

    let out = argot()
        .arg(&schema)
        .arg("--")
        .args(["in.txt", "-level", "3", "-v"])
        .output()
        .expect("failed to run argot");
    assert!(
        out.status.success(),
        "argot failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    let bound: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout is not JSON");
    assert_eq!(bound["input"], "in.txt");
    assert_eq!(bound["level"], 3);
    assert_eq!(bound["verbose"], true);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_failure_exits_with_status_two() {
    let dir = make_temp_dir("fail");
    let schema = write_schema(&dir);

    let out = argot()
        .arg(&schema)
        .output()
        .expect("failed to run argot");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("missing required argument"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_schema_is_rejected_before_parsing() {
    let dir = make_temp_dir("badschema");
    // required positional after an optional one
    let schema = r#"[
  { "name": "opt", "position": 0 },
  { "name": "req", "position": 1, "required": true }
]"#;
    let path = dir.join("schema.json");
    fs::write(&path, schema).expect("failed to write schema");

    let out = argot().arg(&path).output().expect("failed to run argot");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("invalid schema JSON"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn version_switch_cancels_own_parse() {
    let out = argot().arg("-version").output().expect("failed to run argot");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("argot "), "unexpected stdout:\n{stdout}");
}
