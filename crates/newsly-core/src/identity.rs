use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Stable article identifier: lowercase hex SHA-256 of the URL bytes.
///
/// The URL is hashed verbatim. Callers reject blank URLs before getting here.
pub fn article_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
