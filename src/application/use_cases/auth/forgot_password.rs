use chrono::{TimeZone, Utc};

use crate::application::error::ServiceResult;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::token_service::{TokenPurpose, TokenService};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::normalize_email;

pub struct ForgotPassword<'a, R, T, M>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    M: Mailer + ?Sized,
{
    pub repo: &'a R,
    pub tokens: &'a T,
    pub mailer: &'a M,
}

impl<'a, R, T, M> ForgotPassword<'a, R, T, M>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    M: Mailer + ?Sized,
{
    /// Succeeds silently for unknown addresses so callers cannot probe accounts.
    pub async fn execute(&self, email: &str) -> ServiceResult<()> {
        let Some(user) = self.repo.find_by_email(&normalize_email(email)).await? else {
            tracing::debug!("password_reset_unknown_email");
            return Ok(());
        };
        let issued = self
            .tokens
            .issue(TokenPurpose::PasswordReset, user.id, None)?;
        let expires_at = Utc
            .timestamp_opt(issued.expires_at, 0)
            .single()
            .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));
        self.repo
            .set_password_reset(user.id, &issued.token, expires_at)
            .await?;
        self.mailer
            .send_password_reset_email(&user.email, &issued.token)
            .await?;
        tracing::info!(user_id = %user.id, "password_reset_requested");
        Ok(())
    }
}
