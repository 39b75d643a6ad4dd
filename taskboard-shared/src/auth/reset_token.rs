/// Password reset token utilities
///
/// Reset tokens are 32 random bytes, hex-encoded (64 characters). Only the
/// SHA-256 digest of a token is persisted; the plaintext goes out once, in
/// the reset email, and is never stored or logged.
///
/// The digest is deterministic, so the store can find the pending reset by
/// an indexed equality lookup instead of comparing against every user.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::reset_token::{generate_reset_token, hash_reset_token};
///
/// let (token, hash) = generate_reset_token();
/// assert_eq!(token.len(), 64);
/// assert_eq!(hash_reset_token(&token), hash);
/// ```

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a token
const TOKEN_BYTES: usize = 32;

/// Length of the hex-encoded token
pub const RESET_TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// Generates a new reset token
///
/// Returns `(plaintext_token, sha256_hex_digest)`.
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let token = hex::encode(bytes);
    let hash = hash_reset_token(&token);

    (token, hash)
}

/// Hashes a reset token with SHA-256, hex-encoded
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks the token looks like one we issued (64 lowercase hex chars)
///
/// Malformed tokens can be rejected without touching storage.
pub fn validate_reset_token_format(token: &str) -> bool {
    token.len() == RESET_TOKEN_LENGTH
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reset_token() {
        let (token, hash) = generate_reset_token();

        assert_eq!(token.len(), RESET_TOKEN_LENGTH);
        assert_eq!(hash.len(), 64);
        assert_ne!(token, hash);
        assert!(validate_reset_token_format(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let (a, _) = generate_reset_token();
        let (b, _) = generate_reset_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_reset_token("abc"), hash_reset_token("abc"));
        assert_ne!(hash_reset_token("abc"), hash_reset_token("abd"));
        assert_eq!(
            hash_reset_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_validate_reset_token_format() {
        assert!(validate_reset_token_format(&"a1".repeat(32)));
        assert!(!validate_reset_token_format("short"));
        assert!(!validate_reset_token_format(&"A1".repeat(32)));
        assert!(!validate_reset_token_format(&"zz".repeat(32)));
    }
}
