//! Digest helpers for bearer-token storage.
//!
//! Tokens are never stored in plaintext: the database keeps a SHA-256
//! digest plus a short plaintext prefix used for log correlation.

use sha2::{Digest, Sha256};

/// Number of leading plaintext characters kept alongside the digest.
pub const TOKEN_PREFIX_LENGTH: usize = 8;

/// Computes the lowercase hex SHA-256 digest of the input.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts the loggable prefix of a token.
///
/// Returns `None` if the token is shorter than the prefix length.
pub fn token_prefix(token: &str) -> Option<&str> {
    if token.len() < TOKEN_PREFIX_LENGTH {
        return None;
    }
    token.get(..TOKEN_PREFIX_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_length() {
        // SHA-256 produces 32 bytes = 64 hex chars
        assert_eq!(sha256_hex("test").len(), 64);
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same input"), sha256_hex("same input"));
        assert_ne!(sha256_hex("input a"), sha256_hex("input b"));
    }

    #[test]
    fn test_token_prefix() {
        assert_eq!(token_prefix("abcdefghij1234567890"), Some("abcdefgh"));
        assert_eq!(token_prefix("short"), None);
    }
}
