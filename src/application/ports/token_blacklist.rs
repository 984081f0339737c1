/// Revoked bearer tokens. Entries only need to outlive the token's own expiry.
pub trait TokenBlacklist: Send + Sync {
    fn revoke(&self, token: &str, expires_at: i64);
    fn is_revoked(&self, token: &str) -> bool;
}
