use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::user_repository::{UserChanges, UserRepository};
use crate::domain::users::user::{User, normalize_email};

pub struct GetProfile<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetProfile<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> ServiceResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

pub struct UpdateProfile<'a, R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub repo: &'a R,
    pub hasher: &'a H,
}

impl<'a, R, H> UpdateProfile<'a, R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, changes: &ProfileChanges) -> ServiceResult<User> {
        let mut update = UserChanges {
            name: changes.name.as_deref().map(|n| n.trim().to_string()),
            avatar: changes.avatar.clone(),
            ..Default::default()
        };
        if let Some(email) = changes.email.as_deref() {
            let email = normalize_email(email);
            if let Some(other) = self.repo.find_by_email(&email).await? {
                if other.id != user_id {
                    return Err(ServiceError::conflict("The email is already in use"));
                }
            }
            update.email = Some(email);
        }
        if let Some(password) = changes.password.as_deref() {
            update.password_hash = Some(self.hasher.hash(password).await?);
        }
        self.repo
            .update_user(user_id, &update)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::{MemoryStore, PlainHasher};

    #[tokio::test]
    async fn updates_fields_and_rehashes_password() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);
        let uc = UpdateProfile {
            repo: &store,
            hasher: &PlainHasher,
        };
        let updated = uc
            .execute(
                user.id,
                &ProfileChanges {
                    name: Some(" Ana María ".into()),
                    email: Some("ANA.M@example.com".into()),
                    password: Some("Fresh123!".into()),
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("Ana María"));
        assert_eq!(updated.email, "ana.m@example.com");
        assert_eq!(updated.password_hash, PlainHasher::hashed("Fresh123!"));
    }

    #[tokio::test]
    async fn email_owned_by_someone_else_conflicts() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);
        store.seed_user("luis@example.com", "x", true);
        let err = UpdateProfile {
            repo: &store,
            hasher: &PlainHasher,
        }
        .execute(
            user.id,
            &ProfileChanges {
                email: Some("luis@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn keeping_own_email_is_fine() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);
        let res = UpdateProfile {
            repo: &store,
            hasher: &PlainHasher,
        }
        .execute(
            user.id,
            &ProfileChanges {
                email: Some("ana@example.com".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(res.is_ok());
    }
}
