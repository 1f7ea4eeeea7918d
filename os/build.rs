use std::env;

/// Target triple prefixes whose cores implement LDREX/STREX on words and the
/// DMB instruction.
const LDREX_PREFIXES: &[&str] = &["armv7", "thumbv7", "armv8", "thumbv8m.main"];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LILOS_SYNC_BACKEND");
    println!("cargo:rustc-check-cfg=cfg(has_ldrex)");

    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if arch != "arm" {
        return;
    }

    let has_ldrex = match env::var("LILOS_SYNC_BACKEND").ok().as_deref() {
        Some("ldrex") => true,
        Some("helper") => false,
        Some(other) => panic!(
            "LILOS_SYNC_BACKEND must be `ldrex` or `helper`, not `{other}`"
        ),
        None => {
            let target = env::var("TARGET").unwrap_or_default();
            let cpu = target.split('-').next().unwrap_or("");
            LDREX_PREFIXES.iter().any(|p| cpu.starts_with(p))
        }
    };

    if has_ldrex {
        println!("cargo:rustc-cfg=has_ldrex");
    }
}
