// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=STEREOGRAM_VERSION");

    // Packagers can pin the reported version without a git checkout
    let version = std::env::var("STEREOGRAM_VERSION").unwrap_or_else(|_| version_from_git());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// "0.1.0" when built from a release tag, "0.1.0+abcdef1" otherwise.
fn version_from_git() -> String {
    let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    let Some(describe) = git(&["describe", "--tags", "--always", "--match", "v*"]) else {
        return pkg_version;
    };

    let describe = describe.strip_prefix('v').unwrap_or(&describe);
    if describe == pkg_version {
        return pkg_version;
    }

    match git(&["rev-parse", "--short", "HEAD"]) {
        Some(hash) => format!("{}+{}", pkg_version, hash),
        None => pkg_version,
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}
