use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let commit_full = env::var("GITHUB_SHA")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| git(&["rev-parse", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());
    let commit_short = match commit_full.as_str() {
        "unknown" => "unknown".to_string(),
        full => full.chars().take(7).collect(),
    };
    let build_date = git(&["log", "-1", "--format=%cs"]).unwrap_or_else(|| "unknown".to_string());

    emit("BUSLENS_BUILD_COMMIT", &commit_short);
    emit("BUSLENS_BUILD_COMMIT_FULL", &commit_full);
    emit("BUSLENS_BUILD_DATE", &build_date);
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}
