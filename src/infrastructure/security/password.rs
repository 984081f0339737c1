use async_trait::async_trait;

use crate::application::ports::password_hasher::PasswordHasher;

pub const DEFAULT_COST: u32 = 12;
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// bcrypt on the blocking pool.
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let plain = plain.to_string();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
        Ok(hashed)
    }

    async fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let plain = plain.to_string();
        let hash = hash.to_string();
        let ok = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash)).await??;
        Ok(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_and_verifies() {
        let hasher = BcryptPasswordHasher::new(MIN_COST);
        let hash = hasher.hash("Secret123!").await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("Secret123!", &hash).await.unwrap());
        assert!(!hasher.verify("secret123!", &hash).await.unwrap());
    }

    #[test]
    fn cost_is_clamped() {
        assert_eq!(BcryptPasswordHasher::new(1).cost, MIN_COST);
    }
}
