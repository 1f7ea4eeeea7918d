//! Builds the library for the bare-metal targets the helper and LDREX
//! backends serve, without `std`.
//!
//! Ignored by default since it needs the targets installed:
//!
//! ```text
//! rustup target add thumbv6m-none-eabi thumbv7m-none-eabi
//! cargo test --test targets -- --ignored
//! ```

use std::path::Path;
use std::process::Command;

/// ARMv6-M (interrupt-free helper backend) and ARMv7-M (LDREX backend).
const NO_STD_TARGETS: &[&str] = &["thumbv6m-none-eabi", "thumbv7m-none-eabi"];

fn cargo_build_no_std(target: &str) {
    let cargo = option_env!("CARGO").unwrap_or("cargo");
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("no-std");
    let out = Command::new(cargo)
        .arg("build")
        .arg("--lib")
        .arg("--no-default-features")
        .arg("--target")
        .arg(target)
        .arg("--manifest-path")
        .arg(&manifest)
        .arg("--target-dir")
        .arg(&target_dir)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "no_std build for {target} failed:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
#[ignore = "needs thumbv6m-none-eabi and thumbv7m-none-eabi installed"]
fn builds_without_std_on_cortex_m() {
    for target in NO_STD_TARGETS {
        cargo_build_no_std(target);
    }
}
