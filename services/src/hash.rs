use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest.
pub const SHORT_HASH_LEN: usize = 16;

/// Lowercase hex SHA-256 of a string.
pub fn sha_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    format!("{:x}", h.finalize())
}

/// Short content digest used as dedup key and id suffix.
pub fn short_hash(s: &str) -> String {
    let mut full = sha_hex(s);
    full.truncate(SHORT_HASH_LEN);
    full
}
