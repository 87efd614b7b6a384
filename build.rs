use std::process::{Command, Output};

/// Run a git command, returning its output only when it succeeded.
fn git(args: &[&str]) -> Option<Output> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=.git/refs/tags/");

    let hash = git(&["rev-parse", "--short", "HEAD"])
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string());

    // A release build sits exactly on a tag.
    let tagged = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    let dirty = git(&["status", "--porcelain"]).is_some_and(|output| !output.stdout.is_empty());
    let suffix = if dirty { "-dirty" } else { "" };

    println!("cargo:rustc-env=INKMIND_GIT_HASH={hash}{suffix}");
    println!("cargo:rustc-env=INKMIND_IS_RELEASE={tagged}");
}
