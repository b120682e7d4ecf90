//! One-time verification codes
//!
//! Codes are delivered out-of-band by email; only their Argon2 hash is
//! stored, alongside the pending account.

use rand::Rng;

/// Generate a 6-digit verification code
///
/// Uniformly random in 100000..=999999, so the rendered string is always
/// exactly six digits.
pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_digits_in_range() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));

            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_codes_vary() {
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_code()).collect();
        // 50 draws from 900k values colliding down to 1 would mean a broken RNG
        assert!(codes.len() > 1);
    }
}
