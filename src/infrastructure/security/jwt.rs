use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::token_service::{
    IssuedToken, TokenClaims, TokenPurpose, TokenService,
};

pub const EMAIL_VERIFICATION_TTL_SECS: i64 = 24 * 60 * 60;
pub const PASSWORD_RESET_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    typ: String,
    iat: i64,
    exp: i64,
}

fn purpose_tag(purpose: TokenPurpose) -> &'static str {
    match purpose {
        TokenPurpose::Access => "access",
        TokenPurpose::EmailVerification => "email_verification",
        TokenPurpose::PasswordReset => "password_reset",
    }
}

/// HS256 tokens signed with the configured secret.
pub struct JwtTokenService {
    secret: String,
    access_ttl_secs: i64,
}

impl JwtTokenService {
    pub fn new(secret: impl Into<String>, access_ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_secs,
        }
    }

    fn ttl(&self, purpose: TokenPurpose) -> i64 {
        match purpose {
            TokenPurpose::Access => self.access_ttl_secs,
            TokenPurpose::EmailVerification => EMAIL_VERIFICATION_TTL_SECS,
            TokenPurpose::PasswordReset => PASSWORD_RESET_TTL_SECS,
        }
    }

    fn sign(
        &self,
        purpose: TokenPurpose,
        sub: Uuid,
        email: Option<&str>,
        ttl_secs: i64,
    ) -> anyhow::Result<IssuedToken> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            email: email.map(str::to_string),
            typ: purpose_tag(purpose).to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }
}

impl TokenService for JwtTokenService {
    fn issue(
        &self,
        purpose: TokenPurpose,
        sub: Uuid,
        email: Option<&str>,
    ) -> anyhow::Result<IssuedToken> {
        self.sign(purpose, sub, email, self.ttl(purpose))
    }

    fn verify(&self, token: &str, purpose: TokenPurpose) -> anyhow::Result<TokenClaims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        let claims = data.claims;
        if claims.typ != purpose_tag(purpose) {
            anyhow::bail!("token issued for {} used as {}", claims.typ, purpose_tag(purpose));
        }
        Ok(TokenClaims {
            sub: Uuid::parse_str(&claims.sub)?,
            email: claims.email,
            iat: claims.iat,
            exp: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtTokenService {
        JwtTokenService::new("test-secret-of-decent-length", 3600)
    }

    #[test]
    fn access_token_round_trip() {
        let svc = service();
        let id = Uuid::new_v4();
        let issued = svc
            .issue(TokenPurpose::Access, id, Some("ana@example.com"))
            .unwrap();
        let claims = svc.verify(&issued.token, TokenPurpose::Access).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email.as_deref(), Some("ana@example.com"));
        assert_eq!(claims.exp, issued.expires_at);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn lifetimes_depend_on_purpose() {
        let svc = service();
        let id = Uuid::new_v4();
        let verify = svc.issue(TokenPurpose::EmailVerification, id, None).unwrap();
        let reset = svc.issue(TokenPurpose::PasswordReset, id, None).unwrap();
        let now = chrono::Utc::now().timestamp();
        assert!(verify.expires_at - now > 23 * 3600);
        assert!(reset.expires_at - now <= 3600);
    }

    #[test]
    fn rejects_expired_tokens() {
        let svc = service();
        let issued = svc
            .sign(TokenPurpose::Access, Uuid::new_v4(), None, -30)
            .unwrap();
        assert!(svc.verify(&issued.token, TokenPurpose::Access).is_err());
    }

    #[test]
    fn rejects_foreign_signature_and_wrong_purpose() {
        let svc = service();
        let other = JwtTokenService::new("another-secret-entirely", 3600);
        let id = Uuid::new_v4();
        let foreign = other.issue(TokenPurpose::Access, id, None).unwrap();
        assert!(svc.verify(&foreign.token, TokenPurpose::Access).is_err());

        let reset = svc.issue(TokenPurpose::PasswordReset, id, None).unwrap();
        assert!(svc.verify(&reset.token, TokenPurpose::Access).is_err());
        assert!(svc.verify("not-a-jwt", TokenPurpose::Access).is_err());
    }
}
