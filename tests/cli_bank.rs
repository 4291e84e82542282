use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "procsim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn run_bank(args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_bank"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run bank");
    assert!(
        output.status.success(),
        "bank failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("parse bank report")
}

#[test]
fn bank_prints_queue_statistics_json() {
    let dir = unique_temp_dir("bank-config");
    let config = write_file(
        &dir,
        "bank.json",
        r#"{ "seed": 7, "iat_min": 10.0, "iat_max": 10.0, "service_time": 15.0 }"#,
    );

    let v = run_bank(&["--config", config.to_str().unwrap(), "--until", "50"]);

    assert_eq!(v["until"], 50.0);
    assert_eq!(v["customers"], 5);
    let line = &v["waiting_line"];
    assert_eq!(line["type"], "queue statistics");
    assert_eq!(line["name"], "waiting line");
    assert_eq!(line["queue_length"]["all"]["duration"], 50.0);
    assert_eq!(line["queue_length"]["all"]["max"], 2.0);
    assert_eq!(line["length_of_stay"]["all"]["entries"], 4);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bank_is_reproducible_for_a_seed() {
    let a = run_bank(&["--seed", "11", "--until", "200"]);
    let b = run_bank(&["--seed", "11", "--until", "200"]);
    assert_eq!(a, b);
    assert!(a["customers"].as_u64().expect("customers") > 0);
}

#[test]
fn bank_writes_json_lines_trace() {
    let dir = unique_temp_dir("bank-trace");
    let trace = dir.join("trace.jsonl");

    run_bank(&["--until", "30", "--trace-json", trace.to_str().unwrap()]);

    let raw = fs::read_to_string(&trace).expect("read trace");
    let events: Vec<Value> = raw
        .lines()
        .map(|l| serde_json::from_str(l).expect("parse trace line"))
        .collect();
    assert!(!events.is_empty(), "trace should contain events");
    assert_eq!(events[0]["kind"], "interaction");
    assert!(events.iter().any(|e| e["action"] == "create"
        && e["source"].as_str() == Some("Clerk.1")));
    let times: Vec<f64> = events
        .iter()
        .map(|e| e["time"].as_f64().expect("time"))
        .collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]), "trace out of time order");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bank_rejects_an_invalid_config() {
    let dir = unique_temp_dir("bank-invalid");
    let config = write_file(&dir, "bank.json", r#"{ "clerks": 0 }"#);

    let output = Command::new(env!("CARGO_BIN_EXE_bank"))
        .args(["--config", config.to_str().unwrap()])
        .output()
        .expect("run bank");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("clerk"));

    let _ = fs::remove_dir_all(&dir);
}
