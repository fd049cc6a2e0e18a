//! Build script for the FinMentor engine
//!
//! Embeds git revision, build timestamp, target and compiler into the binary
//! so that `finmentor version` can report which build scored a household.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = run("git", &["rev-parse", "--short=8", "HEAD"]);
    let git_branch = run("git", &["rev-parse", "--abbrev-ref", "HEAD"]);
    let git_dirty = match Command::new("git").args(["status", "--porcelain"]).output() {
        Ok(out) if out.status.success() => (!out.stdout.is_empty()).to_string(),
        _ => "unknown".to_string(),
    };

    let vars = [
        ("GIT_HASH", git_hash),
        ("GIT_BRANCH", git_branch),
        ("GIT_DIRTY", git_dirty),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        ("TARGET", cargo_var("TARGET")),
        ("PROFILE", cargo_var("PROFILE")),
        ("HOST", cargo_var("HOST")),
        ("RUSTC_VERSION", run("rustc", &["--version"])),
    ];

    for (key, value) in &vars {
        println!("cargo:rustc-env=FINMENTOR_{}={}", key, value);
    }
}

fn cargo_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| "unknown".to_string())
}

/// Trimmed stdout of a successful command, or "unknown"
fn run(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
