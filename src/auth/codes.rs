//! One-time code and token generation.

use rand::Rng;

/// Alphanumeric alphabet for codes and tokens (62 characters).
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a registration verification code.
pub const VERIFICATION_CODE_LEN: usize = 10;

/// Length of a password-reset token. Longer than a verification code since
/// it travels in a link rather than being typed.
pub const RESET_TOKEN_LEN: usize = 20;

/// Generate a random string of `len` characters from the alphanumeric
/// alphabet. Codes for different emails are not checked for uniqueness —
/// the 62^len space makes collisions negligible.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn code_has_requested_length() {
        assert_eq!(random_string(VERIFICATION_CODE_LEN).len(), 10);
        assert_eq!(random_string(RESET_TOKEN_LEN).len(), 20);
    }

    #[test]
    fn code_is_alphanumeric() {
        let code = random_string(64);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn codes_are_mostly_unique() {
        let codes: HashSet<String> = (0..100).map(|_| random_string(10)).collect();
        assert!(codes.len() > 95, "Should generate mostly unique codes");
    }
}
