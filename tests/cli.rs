use std::env;
use std::fs;
use std::path::PathBuf;

use assert_cmd::{cargo_bin_cmd, Command};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

fn events_ical() -> Command {
    let mut cmd = cargo_bin_cmd!("events-ical");
    cmd.env("LOG", "events_ical=warn");
    cmd
}

/// Unique path inside the system temp dir, removed if it already exists.
fn temp_path(name: &str, ext: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("{name}_events_ical_cli.{ext}"));
    fs::remove_file(&path).ok();
    path
}

const EVENTS: &str = r#"events:
  - id: 1
    title: "Bowling Night"
    date: "2024-12-15"
    time: "10:00 AM"
    location: "Lucky Strike Lanes"
  - id: 2
    title: "League Finals"
    date: "2024-12-15"
    start_time: "2:00 PM"
    end_time: "4:00 PM"
    location: "Lucky Strike Lanes"
"#;

#[test]
fn generates_calendar_file() {
    let input = temp_path("generate", "yaml");
    let output = temp_path("generate", "ics");
    fs::write(&input, EVENTS).unwrap();

    events_ical()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(
            contains("Found 2 events")
                .and(contains("Bowling Night - 2024-12-15 at 10:00 AM"))
                .and(contains("League Finals - 2024-12-15 at 2:00 PM")),
        );

    let ics = fs::read_to_string(&output).unwrap();
    assert!(ics.contains("UID:event-1@mewhenbowling.com"));
    assert!(ics.contains("DTSTART:20241215T100000Z"));
    assert!(ics.contains("DTEND:20241215T110000Z"));
    assert!(ics.contains("DTSTART:20241215T140000Z"));
    assert!(ics.contains("DTEND:20241215T160000Z"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
}

#[test]
fn missing_input_uses_sample_events() {
    let input = temp_path("missing_input", "yaml");
    let output = temp_path("missing_input", "ics");

    events_ical()
        .args(["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Found 4 events").and(contains("Team Meeting")))
        .stderr(contains("Falling back to sample events"));

    let ics = fs::read_to_string(&output).unwrap();
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 4);
}

#[test]
fn unwritable_output_fails() {
    let input = temp_path("unwritable", "yaml");
    fs::write(&input, EVENTS).unwrap();

    let mut output = env::temp_dir();
    output.push("events_ical_cli_no_such_dir");
    fs::remove_dir_all(&output).ok();
    output.push("calendar.ics");

    events_ical()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(contains("failed to write"));
}

#[test]
fn rejects_unknown_flags() {
    events_ical().arg("--bogus").assert().failure();
}

#[test]
fn prints_help() {
    events_ical()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--input").and(contains("--serve")));
}
