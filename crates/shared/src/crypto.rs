//! API key generation and hashing.
//!
//! Keys have the form `wr_<32 alphanumeric chars>`. Only the SHA-256 hash is
//! stored; the 8-character prefix after `wr_` is kept in clear for display.

use sha2::{Digest, Sha256};

/// Minimum length of a well-formed key: "wr_" plus an 8-character prefix.
const MIN_KEY_LEN: usize = 11;

/// Computes the SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts the display prefix from an API key (first 8 characters after "wr_").
///
/// Returns `None` when the key does not have the expected shape.
pub fn extract_key_prefix(key: &str) -> Option<&str> {
    if key.starts_with("wr_") && key.len() >= MIN_KEY_LEN {
        Some(&key[3..11])
    } else {
        None
    }
}

/// Generates a new API key with the `wr_` prefix.
pub fn generate_api_key() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let key: String = (0..32)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("wr_{}", key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same_input"), sha256_hex("same_input"));
        assert_ne!(sha256_hex("input1"), sha256_hex("input2"));
    }

    #[test]
    fn test_extract_key_prefix() {
        assert_eq!(extract_key_prefix("wr_abcdefgh12345"), Some("abcdefgh"));
        assert_eq!(extract_key_prefix("wr_12345678"), Some("12345678"));
        assert_eq!(extract_key_prefix("wr_1234567"), None);
        assert_eq!(extract_key_prefix("sk_abcdefgh12345"), None);
        assert_eq!(extract_key_prefix(""), None);
    }

    #[test]
    fn test_generate_api_key_shape() {
        let key = generate_api_key();
        assert!(key.starts_with("wr_"));
        assert_eq!(key.len(), 35);
        assert_eq!(extract_key_prefix(&key).unwrap().len(), 8);
    }

    #[test]
    fn test_generated_keys_are_unique() {
        assert_ne!(generate_api_key(), generate_api_key());
    }
}
