//! SHA-256 of saved artifacts, computed on request after the download.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of a file, read in fixed-size chunks.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hashes `path` and compares the digest with `expected` (hex, any case).
/// Returns the digest when they match.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<String> {
    let actual = sha256_path(path)?;
    let expected = expected.trim();
    if !actual.eq_ignore_ascii_case(expected) {
        bail!("checksum mismatch: expected {}, got {}", expected, actual);
    }
    Ok(actual)
}
