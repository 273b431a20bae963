//! Random public-key and token generation.
//!
//! Entities are addressed in URLs by short random alphanumeric keys
//! rather than database row ids; bearer tokens use the same charset at a
//! longer length.

use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of entity public keys.
pub const PUBLIC_KEY_LENGTH: usize = 10;

/// Length of bearer tokens issued at login.
pub const TOKEN_LENGTH: usize = 20;

fn random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Generates a fresh entity public key.
pub fn generate_public_key() -> String {
    random_string(PUBLIC_KEY_LENGTH)
}

/// Generates a fresh bearer token.
pub fn generate_token() -> String {
    random_string(TOKEN_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_length() {
        assert_eq!(generate_public_key().len(), PUBLIC_KEY_LENGTH);
    }

    #[test]
    fn test_token_length() {
        assert_eq!(generate_token().len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_keys_are_alphanumeric() {
        let key = generate_public_key();
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_keys_are_random() {
        // Collision over a handful of draws would indicate a broken RNG.
        let keys: Vec<String> = (0..16).map(|_| generate_public_key()).collect();
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
    }
}
