use std::{env, process::Command};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let hash = command_stdout("git", &["rev-parse", "--short", "HEAD"]);
    emit("PARKING_CORE_BUILD_HASH", hash.as_deref().unwrap_or("unknown"));

    let status = command_stdout("git", &["status", "--porcelain"])
        .map(|changes| if changes.is_empty() { "clean" } else { "dirty" });
    emit("PARKING_CORE_BUILD_STATUS", status.unwrap_or("unknown"));

    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    emit("PARKING_CORE_BUILD_TIMESTAMP", &timestamp);

    for (key, var) in [
        ("PARKING_CORE_BUILD_TARGET", "TARGET"),
        ("PARKING_CORE_BUILD_PROFILE", "PROFILE"),
    ] {
        emit(key, &env::var(var).unwrap_or_else(|_| "unknown".into()));
    }
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

/// Trimmed stdout of a successful command. `Some("")` means it printed nothing.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
