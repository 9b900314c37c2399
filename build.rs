//! Build script for SNA
//!
//! Bumps the persisted build counter and exposes build metadata to the crate.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

fn read_build_number(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter_path = Path::new(BUILD_NUMBER_FILE);
    let build_number = read_build_number(counter_path) + 1;

    if let Err(e) = fs::write(counter_path, build_number.to_string()) {
        println!("cargo:warning=Could not persist build number: {}", e);
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=SNA_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=SNA_BUILD_TIMESTAMP={}", timestamp);
}
