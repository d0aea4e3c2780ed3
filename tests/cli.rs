use std::fs;
use std::path::Path;

use clap::Parser;
use parkade::app::{run_with, Cli, Outcome};
use serde_json::{json, Value};

fn write_config(dir: &Path) -> String {
    let path = dir.join("parkade.json");
    let config = json!({
        "capacities": { "two_wheeler": 1, "three_wheeler": 1, "four_wheeler": 2 },
        "admin_secret": "s3cret",
        "storage": { "data_dir": dir },
        "log": { "level": "DEBUG", "path": dir.join("parkade.log") }
    });
    fs::write(&path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

fn run(config: &str, args: &[&str]) -> (Outcome, String) {
    let mut argv = vec!["parkade", "--config", config];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("arguments parse");
    let mut out = Vec::new();
    let outcome = run_with(cli, &mut out).expect("command runs");
    (outcome, String::from_utf8(out).unwrap())
}

#[test]
fn park_status_unpark_cycle_persists_between_runs() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_config(tmp.path());

    let (outcome, text) = run(&config, &["park", " mh12ab1234 ", "4w"]);
    assert_eq!(outcome, Outcome::Completed);
    assert!(text.contains("Vehicle parked successfully!"));
    assert!(text.contains("Slot: 1 (Four-Wheeler)"));
    assert!(tmp.path().join("parking_data.json").exists());

    let (_, text) = run(&config, &["status"]);
    assert!(text.contains("MH12AB1234"));
    assert!(text.contains("Four-Wheeler: 1 / 2"));

    let (outcome, text) = run(&config, &["park", "MH12AB1234", "1"]);
    assert_eq!(outcome, Outcome::Rejected);
    assert!(text.contains("already parked"));

    let (outcome, text) = run(&config, &["unpark", "MH12AB1234"]);
    assert_eq!(outcome, Outcome::Completed);
    assert!(text.contains("Total Charge: Rs. 20.00"));

    let (_, text) = run(&config, &["status"]);
    assert!(text.contains("No vehicles currently parked"));

    let log = fs::read_to_string(tmp.path().join("parkade.log")).unwrap();
    assert!(log.lines().any(|line| line.contains("\"event\":\"unpark\"")));
}

#[test]
fn rejections_are_reported_with_reasons_in_json_mode() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_config(tmp.path());

    let (outcome, text) = run(&config, &["--json", "park", "BAD", "2"]);
    assert_eq!(outcome, Outcome::Rejected);
    let value: Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(value["reason"], "ERR_INVALID_FORMAT");

    let (outcome, _) = run(&config, &["park", "KA01AB0001", "3w"]);
    assert_eq!(outcome, Outcome::Completed);
    let (outcome, text) = run(&config, &["--json", "park", "KA01AB0002", "3w"]);
    assert_eq!(outcome, Outcome::Rejected);
    let value: Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(value["reason"], "ERR_NO_SLOT_AVAILABLE");

    let (outcome, text) = run(&config, &["unpark", "   "]);
    assert_eq!(outcome, Outcome::Rejected);
    assert!(text.contains("Please enter a vehicle number"));
}

#[test]
fn revenue_commands_require_the_configured_secret() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_config(tmp.path());
    run(&config, &["park", "MH12AB1234", "two-wheeler"]);
    run(&config, &["unpark", "MH12AB1234"]);

    let (outcome, text) = run(&config, &["revenue", "--secret", "admin123"]);
    assert_eq!(outcome, Outcome::Rejected);
    assert!(text.contains("credential rejected"));

    let (outcome, text) = run(&config, &["--json", "revenue", "--secret", "s3cret"]);
    assert_eq!(outcome, Outcome::Completed);
    let value: Value = serde_json::from_str(&text).unwrap();
    let days = value.as_object().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days.values().next().unwrap(), &json!(2000));

    let (outcome, text) = run(&config, &["clear-revenue", "--secret", "s3cret"]);
    assert_eq!(outcome, Outcome::Completed);
    assert!(text.contains("cleared"));

    let (_, text) = run(&config, &["revenue", "--secret", "s3cret"]);
    assert!(text.contains("No revenue data available"));
}

#[test]
fn bad_configuration_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("broken.json");
    fs::write(&path, "{ \"hourly_rate\": -2 }").unwrap();
    let cli = Cli::try_parse_from(["parkade", "--config", path.to_str().unwrap(), "status"])
        .unwrap();
    let mut out = Vec::new();
    assert!(run_with(cli, &mut out).is_err());
}
