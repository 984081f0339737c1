use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Access,
    EmailVerification,
    PasswordReset,
}

pub trait TokenService: Send + Sync {
    fn issue(
        &self,
        purpose: TokenPurpose,
        sub: Uuid,
        email: Option<&str>,
    ) -> anyhow::Result<IssuedToken>;
    /// Checks signature, expiry and that the token was issued for `purpose`.
    fn verify(&self, token: &str, purpose: TokenPurpose) -> anyhow::Result<TokenClaims>;
}
