use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::token_service::{TokenPurpose, TokenService};
use crate::application::ports::user_repository::UserRepository;

pub struct VerifyEmail<'a, R, T>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
{
    pub repo: &'a R,
    pub tokens: &'a T,
}

impl<'a, R, T> VerifyEmail<'a, R, T>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
{
    pub async fn execute(&self, token: &str) -> ServiceResult<()> {
        let invalid = || ServiceError::bad_request("Invalid or expired token");
        let claims = self
            .tokens
            .verify(token, TokenPurpose::EmailVerification)
            .map_err(|_| invalid())?;
        let user = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.email_verification_token.as_deref() == Some(token))
            .ok_or_else(invalid)?;
        self.repo.mark_email_verified(user.id).await?;
        tracing::info!(user_id = %user.id, "email_verified");
        Ok(())
    }
}
