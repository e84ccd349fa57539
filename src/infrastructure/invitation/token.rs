//! Invitation token generation
//!
//! Generates cryptographically random, URL-safe invitation tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Generator for opaque invitation tokens
#[derive(Debug, Clone)]
pub struct InviteTokenGenerator {
    /// Prefix for all generated tokens
    prefix: String,
    /// Number of random bytes to generate
    token_bytes: usize,
}

impl InviteTokenGenerator {
    /// Create a new token generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            token_bytes: 32,
        }
    }

    /// Set the number of random bytes
    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        self.token_bytes = bytes;
        self
    }

    /// Generate a new token
    pub fn generate(&self) -> String {
        let mut random_bytes = vec![0u8; self.token_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(&random_bytes))
    }
}

impl Default for InviteTokenGenerator {
    fn default() -> Self {
        Self::new("inv_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invitation::MAX_TOKEN_LENGTH;

    #[test]
    fn test_generate_token() {
        let generator = InviteTokenGenerator::default();
        let token = generator.generate();

        assert!(token.starts_with("inv_"));
        // 32 bytes base64url-encoded = 43 chars, plus prefix
        assert_eq!(token.len(), "inv_".len() + 43);
    }

    #[test]
    fn test_token_uniqueness() {
        let generator = InviteTokenGenerator::default();
        assert_ne!(generator.generate(), generator.generate());
    }

    #[test]
    fn test_token_within_accepted_length() {
        let generator = InviteTokenGenerator::default();
        assert!(generator.generate().len() <= MAX_TOKEN_LENGTH);
    }

    #[test]
    fn test_token_is_url_safe() {
        let generator = InviteTokenGenerator::default();
        let token = generator.generate();

        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_custom_prefix() {
        let generator = InviteTokenGenerator::new("vt_").with_token_bytes(16);
        let token = generator.generate();

        assert!(token.starts_with("vt_"));
        assert_eq!(token.len(), "vt_".len() + 22);
    }
}
