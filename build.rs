use std::{env, fs, path::PathBuf, process::Command};

/// Crates whose resolved versions are recorded in every FITS header.
const REPORTED_CRATES: [(&str, &str); 3] = [
    ("rawloader", "NEF2FITS_VERSION_RAWLOADER"),
    ("kamadak-exif", "NEF2FITS_VERSION_EXIF"),
    ("notify", "NEF2FITS_VERSION_NOTIFY"),
];

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let lock_path = manifest_dir.join("Cargo.lock");
    println!("cargo:rerun-if-changed={}", lock_path.display());
    println!("cargo:rerun-if-changed=build.rs");

    let lock = fs::read_to_string(&lock_path).unwrap_or_default();
    for (name, var) in REPORTED_CRATES {
        let version = locked_version(&lock, name).unwrap_or_else(|| "?".to_string());
        println!("cargo:rustc-env={var}={version}");
    }

    // `rustc 1.85.0 (4d91de4e4 2025-02-17)` -> `1.85.0`
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|s| s.split_whitespace().nth(1).map(str::to_string))
        .unwrap_or_else(|| "?".to_string());
    println!("cargo:rustc-env=NEF2FITS_VERSION_RUSTC={rustc_version}");
}

/// Finds the `version` line of the `[[package]]` entry called `name`.
fn locked_version(lock: &str, name: &str) -> Option<String> {
    let wanted = format!("name = \"{name}\"");
    let mut lines = lock.lines();
    while let Some(line) = lines.next() {
        if line.trim() != wanted {
            continue;
        }
        for next in lines.by_ref() {
            let next = next.trim();
            if let Some(rest) = next.strip_prefix("version = ") {
                return Some(rest.trim_matches('"').to_string());
            }
            if next.is_empty() {
                break;
            }
        }
    }
    None
}
