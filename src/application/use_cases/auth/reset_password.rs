use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::token_service::{TokenPurpose, TokenService};
use crate::application::ports::user_repository::UserRepository;

pub struct ResetPassword<'a, R, T, H>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    H: PasswordHasher + ?Sized,
{
    pub repo: &'a R,
    pub tokens: &'a T,
    pub hasher: &'a H,
}

impl<'a, R, T, H> ResetPassword<'a, R, T, H>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    H: PasswordHasher + ?Sized,
{
    /// A reset token is accepted once: it must still be the one stored on the user.
    pub async fn execute(&self, token: &str, new_password: &str) -> ServiceResult<()> {
        let invalid = || ServiceError::bad_request("Invalid or expired token");
        let claims = self
            .tokens
            .verify(token, TokenPurpose::PasswordReset)
            .map_err(|_| invalid())?;
        let user = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.password_reset_token.as_deref() == Some(token))
            .ok_or_else(invalid)?;
        let expires = user.password_reset_expires.ok_or_else(invalid)?;
        if expires < chrono::Utc::now() {
            return Err(ServiceError::bad_request("Token expired"));
        }
        let hash = self.hasher.hash(new_password).await?;
        self.repo.update_password(user.id, &hash).await?;
        tracing::info!(user_id = %user.id, "password_reset_completed");
        Ok(())
    }
}
