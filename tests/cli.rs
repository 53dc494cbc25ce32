use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const SAMPLE: &str = "Country name,Year,Population\n\
China,1950,543979200\n\
India,1950,357021100\n\
China,1951,554315800\n\
India,1951,363090400\n";

fn popbars() -> Command {
    Command::cargo_bin("popbars").unwrap()
}

#[test]
fn cli_shows_help() {
    let mut cmd = popbars();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("popbars"));
}

#[test]
fn summary_lists_years_and_categories() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, SAMPLE).unwrap();

    popbars()
        .args(["--source", data.to_str().unwrap(), "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("years: 1950, 1951"))
        .stdout(predicate::str::contains("categories: China, India"));
}

#[test]
fn show_prints_the_requested_year() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, SAMPLE).unwrap();

    popbars()
        .args(["--source", data.to_str().unwrap(), "show", "--index", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Population in 1951"))
        .stdout(predicate::str::contains("Total: 917,406,200"));
}

#[test]
fn show_rejects_indices_outside_the_cycle() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, SAMPLE).unwrap();

    // two years, default wrap: cycle is 0..4
    popbars()
        .args(["--source", data.to_str().unwrap(), "show", "--index", "3"])
        .assert()
        .success();
    popbars()
        .args(["--source", data.to_str().unwrap(), "--wrap", "at-count", "show", "--index", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the animation cycle"));
}

#[test]
fn missing_data_degrades_to_an_empty_chart() {
    let dir = tempdir().unwrap();
    popbars()
        .args(["--source", dir.path().join("gone.csv").to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 0"));
}

#[test]
fn export_and_render_write_files() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, SAMPLE).unwrap();
    let json = dir.path().join("top.json");
    let svg = dir.path().join("chart.svg");

    popbars()
        .args(["--source", data.to_str().unwrap(), "export", "--out", json.to_str().unwrap()])
        .assert()
        .success();
    let exported: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 4);
    assert_eq!(exported[0]["name"], "China");

    popbars()
        .args([
            "--source",
            data.to_str().unwrap(),
            "render",
            "--out",
            svg.to_str().unwrap(),
            "--width",
            "640",
            "--height",
            "400",
        ])
        .assert()
        .success();
    assert!(fs::metadata(&svg).unwrap().len() > 0);
}

#[test]
fn play_stops_after_the_requested_ticks() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, SAMPLE).unwrap();

    popbars()
        .args([
            "--source",
            data.to_str().unwrap(),
            "play",
            "--ticks",
            "2",
            "--interval-ms",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Population in 1950"))
        .stdout(predicate::str::contains("Population in 1951"));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, SAMPLE).unwrap();
    let config = dir.path().join("chart.json");
    fs::write(&config, r#"{ "title": "Custom title", "locale": "de" }"#).unwrap();

    popbars()
        .args([
            "--source",
            data.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "show",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Custom title"))
        .stdout(predicate::str::contains("901.000.300"));
}

#[test]
fn render_to_json_writes_the_frame() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, SAMPLE).unwrap();
    let out = dir.path().join("frame.json");

    popbars()
        .args(["--source", data.to_str().unwrap(), "render", "-i", "1", "--out", out.to_str().unwrap()])
        .assert()
        .success();
    let frame: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(frame["year_label"], "1951");
    assert_eq!(frame["total"], 917_406_200);
    assert_eq!(frame["categories"][0], "China");
}
