use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::{NewUser, UserRepository};
use crate::domain::users::user::{User, normalize_email};

pub struct CreateUser<'a, U, R, H>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub users: &'a U,
    pub roles: &'a R,
    pub hasher: &'a H,
}

#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    /// Optional role name granted on creation when it exists and is active.
    pub role: Option<String>,
}

impl<'a, U, R, H> CreateUser<'a, U, R, H>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub async fn execute(&self, req: &CreateUserRequest) -> ServiceResult<User> {
        let email = normalize_email(&req.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict("Email already registered"));
        }
        let password_hash = self.hasher.hash(&req.password).await?;
        let user = self
            .users
            .create_user(&NewUser {
                email,
                name: req.name.as_deref().map(|n| n.trim().to_string()),
                password_hash,
                is_email_verified: false,
            })
            .await?;
        if let Some(role_name) = req.role.as_deref() {
            match self.roles.find_by_name(role_name).await? {
                Some(role) if role.is_active => {
                    self.users.replace_roles(user.id, &[role.id]).await?;
                }
                _ => tracing::warn!(user_id = %user.id, role = role_name, "requested_role_unavailable"),
            }
        }
        tracing::info!(user_id = %user.id, "user_created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::{MemoryStore, PlainHasher};

    #[tokio::test]
    async fn creates_with_role() {
        let store = MemoryStore::default();
        store.seed_role("customer", &[]);
        let user = CreateUser {
            users: &store,
            roles: &store,
            hasher: &PlainHasher,
        }
        .execute(&CreateUserRequest {
            email: " New@Example.com".into(),
            password: "Secret123!".into(),
            name: Some("New".into()),
            role: Some("customer".into()),
        })
        .await
        .unwrap();
        assert_eq!(user.email, "new@example.com");
        assert!(!user.is_email_verified);
        assert_eq!(store.role_names(user.id), vec!["customer".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::default();
        store.seed_user("ana@example.com", "x", true);
        let err = CreateUser {
            users: &store,
            roles: &store,
            hasher: &PlainHasher,
        }
        .execute(&CreateUserRequest {
            email: "ana@example.com".into(),
            password: "Secret123!".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(m) if m == "Email already registered"));
    }
}
