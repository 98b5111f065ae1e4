//! Nonce generation for Upbit API authentication.
//!
//! Upbit rejects tokens whose nonce has been seen before, so every token
//! carries a fresh random UUID.

use uuid::Uuid;

/// Trait for providing nonces for authenticated requests.
pub trait NonceProvider: Send + Sync {
    /// Generate a nonce that has never been returned before.
    fn next_nonce(&self) -> String;
}

/// A nonce provider returning random (v4) UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidNonce;

impl UuidNonce {
    /// Create a new UUID nonce provider.
    pub fn new() -> Self {
        Self
    }
}

impl NonceProvider for UuidNonce {
    fn next_nonce(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nonce_is_hyphenated_uuid() {
        let nonce = UuidNonce::new().next_nonce();
        assert_eq!(nonce.len(), 36);
        assert_eq!(nonce.matches('-').count(), 4);
    }

    #[test]
    fn test_nonces_are_unique() {
        let provider = UuidNonce::new();
        let nonces: HashSet<String> = (0..1000).map(|_| provider.next_nonce()).collect();
        assert_eq!(nonces.len(), 1000);
    }
}
