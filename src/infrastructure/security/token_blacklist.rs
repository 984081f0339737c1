use std::collections::HashMap;
use std::sync::RwLock;

use crate::application::ports::token_blacklist::TokenBlacklist;

/// Process-local revocation list. Tokens are forgotten once their own expiry
/// passes since signature validation rejects them from then on.
#[derive(Default)]
pub struct InMemoryTokenBlacklist {
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn revoke_at(&self, token: &str, expires_at: i64, now: i64) {
        if let Ok(mut map) = self.entries.write() {
            map.retain(|_, exp| *exp > now);
            if expires_at > now {
                map.insert(token.to_string(), expires_at);
            }
        }
    }
}

impl TokenBlacklist for InMemoryTokenBlacklist {
    fn revoke(&self, token: &str, expires_at: i64) {
        self.revoke_at(token, expires_at, chrono::Utc::now().timestamp());
        tracing::debug!(revoked = self.len(), "token_revoked");
    }

    fn is_revoked(&self, token: &str) -> bool {
        self.entries
            .read()
            .map(|m| m.contains_key(token))
            .unwrap_or(false)
    }
}
