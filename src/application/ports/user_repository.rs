use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::users::user::{RoleWithPermissions, User};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub is_email_verified: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub avatar: Option<String>,
    pub is_email_verified: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_email_verified: Option<bool>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
}

/// Lookups ignore soft-deleted rows unless stated otherwise.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, new_user: &NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn list(&self, filter: &UserFilter) -> anyhow::Result<UserPage>;
    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> anyhow::Result<Option<User>>;
    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Clears `deleted_at` on a soft-deleted user.
    async fn restore(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Active roles held by the user, each with its permissions.
    async fn roles_of(&self, user_id: Uuid) -> anyhow::Result<Vec<RoleWithPermissions>>;
    async fn replace_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()>;
    async fn remove_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()>;
    async fn find_by_role(&self, role_name: &str) -> anyhow::Result<Vec<User>>;

    async fn set_email_verification_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> anyhow::Result<()>;
    /// Marks the email verified and consumes the verification token.
    async fn mark_email_verified(&self, id: Uuid) -> anyhow::Result<()>;
    async fn set_password_reset(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    /// Stores a new hash and clears any pending reset token.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()>;
}
