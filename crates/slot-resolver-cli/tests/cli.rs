use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn slots() -> Command {
    Command::cargo_bin("slots").unwrap()
}

fn fixture(name: &str, contents: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn template_file(tag: &str) -> PathBuf {
    fixture(
        &format!("{tag}_template.json"),
        r#"{"closed_day_message": "Closed on Sundays", "weekdays": {"0": [], "1": ["13:00", "14:00"]}}"#,
    )
}

fn booked_file(tag: &str) -> PathBuf {
    fixture(
        &format!("{tag}_booked.json"),
        r#"[{"date": "2024-03-04", "time": "13:00"}]"#,
    )
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn grid_prints_blanks_as_null() {
    let json = stdout_json(slots().args(["grid", "--month", "2024-03"]));
    let cells = json.as_array().unwrap();
    assert_eq!(cells.len(), 36);
    assert!(cells[..5].iter().all(|c| c.is_null()));
    assert_eq!(cells[5], 1);
    assert_eq!(cells[35], 31);
}

#[test]
fn grid_rejects_bad_month() {
    slots()
        .args(["grid", "--month", "2024-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month"));
}

#[test]
fn day_with_booking() {
    let template = template_file("day_with_booking");
    let booked = booked_file("day_with_booking");
    let json = stdout_json(slots().args([
        "day",
        "--date",
        "2024-03-04",
        "--today",
        "2024-03-04",
        "--template",
        template.to_str().unwrap(),
        "--booked",
        booked.to_str().unwrap(),
    ]));
    assert_eq!(json["selectable"], true);
    assert!(json["warning"].is_null());
    assert_eq!(
        json["slots"],
        serde_json::json!([
            {"time": "13:00", "is_booked": true},
            {"time": "14:00", "is_booked": false}
        ])
    );
}

#[test]
fn day_closed_sunday_warns() {
    let template = template_file("day_closed_sunday_warns");
    let json = stdout_json(slots().args([
        "day",
        "--date",
        "2024-03-03",
        "--today",
        "2024-03-01",
        "--template",
        template.to_str().unwrap(),
    ]));
    assert_eq!(json["selectable"], false);
    assert_eq!(json["warning"], "Closed on Sundays");
    assert_eq!(json["slots"], serde_json::json!([]));
}

#[test]
fn day_uses_reference_template_by_default() {
    let json = stdout_json(slots().args(["day", "--date", "2024-03-05", "--today", "2024-03-04"]));
    assert_eq!(json["selectable"], true);
    assert_eq!(json["slots"].as_array().unwrap().len(), 9);
}

#[test]
fn month_with_selection() {
    let template = template_file("month_with_selection");
    let booked = booked_file("month_with_selection");
    let json = stdout_json(slots().args([
        "month",
        "--month",
        "2024-03",
        "--today",
        "2024-03-04",
        "--selected",
        "2024-03-04",
        "--template",
        template.to_str().unwrap(),
        "--booked",
        booked.to_str().unwrap(),
    ]));
    let selectable: Vec<u64> = json["days"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["selectable"] == true)
        .map(|d| d["day"].as_u64().unwrap())
        .collect();
    assert_eq!(selectable, vec![4, 11, 18, 25]);
    assert_eq!(json["selected"]["slots"][0]["is_booked"], true);
}

#[test]
fn check_time_bypass_and_reject() {
    let booked = booked_file("check_time_bypass_and_reject");
    slots()
        .args([
            "check-time",
            "--date",
            "2024-03-04",
            "--time",
            "13:00",
            "--booked",
            booked.to_str().unwrap(),
        ])
        .assert()
        .success();

    slots()
        .args([
            "check-time",
            "--date",
            "2024-03-04",
            "--time",
            "13:00",
            "--reject-booked",
            "--booked",
            booked.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Slot already booked"));
}

#[test]
fn malformed_booked_file_fails() {
    let bad = fixture("cli_bad_booked.json", r#"[{"date": "2024-3-4", "time": "13:00"}]"#);
    slots()
        .args(["day", "--date", "2024-03-04", "--booked", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing booked slots"));
}

#[test]
fn missing_template_file_fails() {
    slots()
        .args(["day", "--date", "2024-03-04", "--template", "/nonexistent/template.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading template"));
}
