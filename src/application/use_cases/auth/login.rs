use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::token_service::{IssuedToken, TokenPurpose, TokenService};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{User, normalize_email};

pub struct Login<'a, R, H, T>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: TokenService + ?Sized,
{
    pub repo: &'a R,
    pub hasher: &'a H,
    pub tokens: &'a T,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: IssuedToken,
}

impl<'a, R, H, T> Login<'a, R, H, T>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: TokenService + ?Sized,
{
    pub async fn execute(&self, req: &LoginRequest) -> ServiceResult<LoginOutcome> {
        let invalid = || ServiceError::unauthorized("Invalid credentials");
        let user = self
            .repo
            .find_by_email(&normalize_email(&req.email))
            .await?
            .ok_or_else(invalid)?;
        if !self
            .hasher
            .verify(req.password.trim(), &user.password_hash)
            .await?
        {
            return Err(invalid());
        }
        if !user.is_email_verified {
            return Err(ServiceError::unauthorized("Please verify your email first"));
        }
        let token = self
            .tokens
            .issue(TokenPurpose::Access, user.id, Some(&user.email))?;
        tracing::info!(user_id = %user.id, "login_succeeded");
        Ok(LoginOutcome { user, token })
    }
}
