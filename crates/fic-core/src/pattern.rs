//! Byte-substring scanning, built on `memchr`'s SIMD-accelerated finder.

use memchr::memmem;

/// The token a mutated binary prints on stdout when a fault has bypassed
/// authentication.
pub const BYPASS_TOKEN: &[u8] = b"g_authenticated = 1,";

/// True if `haystack` contains `BYPASS_TOKEN` anywhere.
pub fn contains_bypass_token(haystack: &[u8]) -> bool {
    memmem::find(haystack, BYPASS_TOKEN).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_token_in_larger_output() {
        let stdout = b"decrypting...\ng_authenticated = 1, welcome\n";
        assert!(contains_bypass_token(stdout));
    }

    #[test]
    fn absent_token_is_not_flagged() {
        let stdout = b"decryption failed\n";
        assert!(!contains_bypass_token(stdout));
    }

    #[test]
    fn empty_stdout_is_not_flagged() {
        assert!(!contains_bypass_token(b""));
    }
}
