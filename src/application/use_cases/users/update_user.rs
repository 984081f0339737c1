use uuid::Uuid;

use crate::application::access::{self, Principal};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::user_repository::{UserChanges, UserRepository};
use crate::domain::users::user::{User, normalize_email};

pub struct UpdateUser<'a, R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub repo: &'a R,
    pub hasher: &'a H,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
    pub is_email_verified: Option<bool>,
}

impl<'a, R, H> UpdateUser<'a, R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub async fn execute(
        &self,
        actor: &Principal,
        id: Uuid,
        req: &UpdateUserRequest,
    ) -> ServiceResult<User> {
        access::require_self_or_admin(actor, id)?;
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ServiceError::not_found("User not found"));
        }
        let mut changes = UserChanges {
            name: req.name.as_deref().map(|n| n.trim().to_string()),
            avatar: req.avatar.clone(),
            // Only administrators may change the verification status.
            is_email_verified: req.is_email_verified.filter(|_| actor.is_admin()),
            ..Default::default()
        };
        if let Some(email) = req.email.as_deref() {
            let email = normalize_email(email);
            if let Some(other) = self.repo.find_by_email(&email).await? {
                if other.id != id {
                    return Err(ServiceError::conflict("Email already registered"));
                }
            }
            changes.email = Some(email);
        }
        if let Some(password) = req.password.as_deref() {
            changes.password_hash = Some(self.hasher.hash(password).await?);
        }
        self.repo
            .update_user(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }
}
