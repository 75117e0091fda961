//! # cp-auth-simple
//!
//! Static-API-key implementation of `AuthProvider` for the editorial
//! endpoints. Keys are compared through their SHA-256 digests so the check
//! does not leak key length or a matching prefix through timing.

use cp_core::traits::AuthProvider;
use sha2::{Digest, Sha256};

pub struct ApiKeyAuth {
    key_digest: [u8; 32],
}

impl ApiKeyAuth {
    /// Accepts the configured key (e.g., from an environment variable).
    pub fn new(key: &str) -> Self {
        Self {
            key_digest: digest(key),
        }
    }
}

fn digest(input: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher.finalize().into()
}

impl AuthProvider for ApiKeyAuth {
    fn verify_api_key(&self, presented: &str) -> bool {
        digest(presented) == self.key_digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_configured_key_only() {
        let auth = ApiKeyAuth::new("sekrit");
        assert!(auth.verify_api_key("sekrit"));
        assert!(!auth.verify_api_key("sekrit "));
        assert!(!auth.verify_api_key(""));
    }
}
