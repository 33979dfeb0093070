use std::{env, process::Command};

const ENV_PREFIX: &str = "REVENUE_FORECAST_BUILD";

fn main() {
    for watched in ["build.rs", ".git/HEAD", ".git/refs"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    let hash = command_stdout("git", &["rev-parse", "--short", "HEAD"])
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".into());
    let status = match command_stdout("git", &["status", "--porcelain"]) {
        Some(changes) if changes.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    emit("HASH", &hash);
    emit("STATUS", status);
    emit("TIMESTAMP", &timestamp);
    emit("TARGET", &env::var("TARGET").unwrap_or_else(|_| "unknown-target".into()));
    emit("PROFILE", &env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".into()));
    emit(
        "RUSTC",
        &command_stdout("rustc", &["--version"]).unwrap_or_else(|| "unknown".into()),
    );
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={ENV_PREFIX}_{key}={value}");
}

/// Trimmed stdout of a successful command, `None` when it cannot run or fails.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
