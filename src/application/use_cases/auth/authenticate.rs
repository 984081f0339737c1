use crate::application::access::Principal;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::ports::token_service::{TokenClaims, TokenPurpose, TokenService};
use crate::application::ports::user_repository::UserRepository;

/// Resolves a bearer token into the calling principal.
pub struct Authenticate<'a, R, T, B>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    B: TokenBlacklist + ?Sized,
{
    pub repo: &'a R,
    pub tokens: &'a T,
    pub blacklist: &'a B,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub claims: TokenClaims,
    pub token: String,
}

impl<'a, R, T, B> Authenticate<'a, R, T, B>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    B: TokenBlacklist + ?Sized,
{
    pub async fn execute(&self, token: &str) -> ServiceResult<Session> {
        if self.blacklist.is_revoked(token) {
            return Err(ServiceError::unauthorized("Token has been revoked"));
        }
        let claims = self
            .tokens
            .verify(token, TokenPurpose::Access)
            .map_err(|_| ServiceError::unauthorized("Invalid or expired token"))?;
        let user = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ServiceError::unauthorized("User not found"))?;
        let roles = self.repo.roles_of(user.id).await?;
        Ok(Session {
            principal: Principal { user, roles },
            claims,
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::{MemoryStore, token_service};
    use crate::infrastructure::security::token_blacklist::InMemoryTokenBlacklist;

    #[tokio::test]
    async fn resolves_roles_and_permissions() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);
        store.grant(user.id, "customer", &["products.read"]);
        let tokens = token_service();
        let blacklist = InMemoryTokenBlacklist::new();
        let issued = tokens
            .issue(TokenPurpose::Access, user.id, Some(&user.email))
            .unwrap();
        let uc = Authenticate {
            repo: &store,
            tokens: &tokens,
            blacklist: &blacklist,
        };
        let session = uc.execute(&issued.token).await.unwrap();
        assert_eq!(session.principal.id(), user.id);
        assert!(crate::application::access::has_permission(
            &session.principal,
            "products.read"
        ));
    }

    #[tokio::test]
    async fn revoked_and_orphaned_tokens_are_rejected() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);
        let tokens = token_service();
        let blacklist = InMemoryTokenBlacklist::new();
        let issued = tokens.issue(TokenPurpose::Access, user.id, None).unwrap();
        let uc = Authenticate {
            repo: &store,
            tokens: &tokens,
            blacklist: &blacklist,
        };

        blacklist.revoke(&issued.token, issued.expires_at);
        let err = uc.execute(&issued.token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m.contains("revoked")));

        let ghost = tokens
            .issue(TokenPurpose::Access, uuid::Uuid::new_v4(), None)
            .unwrap();
        assert!(matches!(
            uc.execute(&ghost.token).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
