mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::{date, test_dir, write_sales_workbook};

const BIN_NAME: &str = "revenue-forecast";

fn cli() -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env_remove("REVENUE_FORECAST_CONFIG")
        .env("RUST_LOG", "off")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn version_flag_prints_package_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_command_prints_build_metadata() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(contains("Revenue Forecast").and(contains("Build hash")));
}

#[test]
fn init_config_writes_once_without_force() {
    let dir = test_dir();
    let path = dir.join("config.json");

    cli()
        .args(["init-config", path.to_str().expect("utf-8 path")])
        .assert()
        .success()
        .stdout(contains("configuration written"));
    assert!(path.exists());

    cli()
        .args(["init-config", path.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(contains("Error:"));

    cli()
        .args(["init-config", "--force", path.to_str().expect("utf-8 path")])
        .assert()
        .success();
}

#[test]
fn inspect_lists_sheets_and_headers() {
    let dir = test_dir();
    let input = dir.join("sales.xlsx");
    write_sales_workbook(&input, date(2025, 1, 1), 20);
    let config = dir.join("config.json");
    cli()
        .args(["init-config", config.to_str().expect("utf-8 path")])
        .assert()
        .success();

    cli()
        .arg("inspect")
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(&input)
        .args(["--rows", "3"])
        .assert()
        .success()
        .stdout(
            contains("Sales")
                .and(contains("Revenue"))
                .and(contains("2025-01-01"))
                .and(contains("3 of 22")),
        );
}

#[test]
fn run_writes_report_without_charts() {
    let dir = test_dir();
    let input = dir.join("sales.xlsx");
    let output = dir.join("out");
    write_sales_workbook(&input, date(2024, 1, 1), 670);
    let config = dir.join("config.json");
    cli()
        .args(["init-config", config.to_str().expect("utf-8 path")])
        .assert()
        .success();

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(&input)
        .arg("--output-dir")
        .arg(&output)
        .args(["--target-year", "2026", "--engine", "baseline", "--skip-charts"])
        .assert()
        .success()
        .stdout(
            contains("Forecast 2026")
                .and(contains("December"))
                .and(contains("revenue_forecast_2026.xlsx")),
        );

    assert!(output.join("revenue_forecast_2026.xlsx").exists());
    assert!(!output.join("forecast_full.png").exists());
}

#[test]
fn missing_input_exits_with_error() {
    let dir = test_dir();
    let config = dir.join("config.json");
    cli()
        .args(["init-config", config.to_str().expect("utf-8 path")])
        .assert()
        .success();

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(dir.join("absent.xlsx"))
        .arg("--skip-charts")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error:").and(contains("absent.xlsx")));
}

#[test]
fn missing_config_file_is_rejected() {
    let dir = test_dir();
    cli()
        .arg("run")
        .arg("--config")
        .arg(dir.join("nope.json"))
        .assert()
        .failure()
        .stderr(contains("Invalid input"));
}
