//! Build script for storefront crate.
//!
//! Hashes the static assets so templates can reference them as
//! `main.css?v=<hash>` and browsers refetch only when the content changes.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Assets to hash and the environment variable each hash is exported as.
const ASSETS: [(&str, &str); 2] = [
    ("static/css/main.css", "CSS_HASH"),
    ("static/js/modal.js", "JS_HASH"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");

    for (relative, var) in ASSETS {
        hash_asset(&Path::new(&manifest_dir).join(relative), var);
    }
}

/// Export the first 8 hex chars of the asset's SHA-256 as `var`.
fn hash_asset(path: &Path, var: &str) {
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            println!("cargo:rustc-env={var}=dev");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = &hash[..8];
    println!("cargo:rustc-env={var}={short_hash}");
}
