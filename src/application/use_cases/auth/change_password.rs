use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::user_repository::UserRepository;

pub struct ChangePassword<'a, R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub repo: &'a R,
    pub hasher: &'a H,
}

#[derive(Debug, Clone)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl<'a, R, H> ChangePassword<'a, R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, req: &ChangePasswordRequest) -> ServiceResult<()> {
        if req.new_password != req.confirm_password {
            return Err(ServiceError::bad_request("The new passwords do not match"));
        }
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;
        if !self
            .hasher
            .verify(&req.current_password, &user.password_hash)
            .await?
        {
            return Err(ServiceError::bad_request(
                "The current password is incorrect",
            ));
        }
        let hash = self.hasher.hash(&req.new_password).await?;
        self.repo.update_password(user.id, &hash).await?;
        tracing::info!(user_id = %user.id, "password_changed");
        Ok(())
    }
}
