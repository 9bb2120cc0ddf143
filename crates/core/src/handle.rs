//! Username ("handle") normalization and validation.
//!
//! A handle is the immutable public key of an account: it names the
//! portfolio URL and the real-time room. Handles are stored lowercase and
//! every lookup normalizes first, so `Alice` and `alice` are the same room.

/// Minimum handle length.
pub const MIN_HANDLE_LEN: usize = 3;
/// Maximum handle length.
pub const MAX_HANDLE_LEN: usize = 30;

/// Lowercase a handle for storage, lookup, or room keying.
pub fn normalize(handle: &str) -> String {
    handle.trim().to_lowercase()
}

/// Validate an already-normalized handle.
///
/// Allowed characters are ASCII lowercase letters, digits, `_`, and `-`.
/// Returns a human-readable reason on rejection.
pub fn validate(handle: &str) -> Result<(), String> {
    if handle.len() < MIN_HANDLE_LEN || handle.len() > MAX_HANDLE_LEN {
        return Err(format!(
            "Username must be between {MIN_HANDLE_LEN} and {MAX_HANDLE_LEN} characters"
        ));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(
            "Username may only contain lowercase letters, digits, '_' and '-'".to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize("  Alice "), "alice");
        assert_eq!(normalize("BOB-42"), "bob-42");
    }

    #[test]
    fn accepts_typical_handles() {
        for handle in ["alice", "bob_42", "my-portfolio", "abc"] {
            assert!(validate(handle).is_ok(), "expected '{handle}' to be valid");
        }
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(validate("ab").is_err());
        assert!(validate(&"a".repeat(31)).is_err());
    }

    #[test]
    fn rejects_bad_characters() {
        assert!(validate("Alice").is_err(), "uppercase must be normalized first");
        assert!(validate("a b").is_err());
        assert!(validate("a.b").is_err());
        assert!(validate("émile").is_err());
    }
}
