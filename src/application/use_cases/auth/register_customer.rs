use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::customer_repository::{
    CustomerRepository, NewCustomerAccount, RegistrationOutcome,
};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::password_hasher::PasswordHasher;
use crate::application::ports::token_service::{TokenPurpose, TokenService};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::customers::customer::{
    CommunicationPreferences, WineType, customer_code, dedup_wine_types,
};
use crate::domain::users::user::{CUSTOMER_ROLE, normalize_email};

pub struct RegisterCustomer<'a, C, H, T>
where
    C: CustomerRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: TokenService + ?Sized,
{
    pub customers: &'a C,
    pub hasher: &'a H,
    pub tokens: &'a T,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterCustomerRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub wine_types: Vec<WineType>,
    pub receive_notifications: Option<bool>,
    pub receive_newsletter: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct RegisteredCustomer {
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub email: String,
    pub access_token: String,
}

impl<'a, C, H, T> RegisterCustomer<'a, C, H, T>
where
    C: CustomerRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: TokenService + ?Sized,
{
    pub async fn execute(&self, req: &RegisterCustomerRequest) -> ServiceResult<RegisteredCustomer> {
        let email = normalize_email(&req.email);
        let password_hash = self.hasher.hash(&req.password).await?;
        let defaults = CommunicationPreferences::default();
        let account = NewCustomerAccount {
            email: email.clone(),
            name: req.name.trim().to_string(),
            password_hash,
            customer_code: customer_code(chrono::Utc::now()),
            phone: req.phone.clone().filter(|p| !p.trim().is_empty()),
            birth_date: req.birth_date,
            communication: CommunicationPreferences {
                receive_notifications: req
                    .receive_notifications
                    .unwrap_or(defaults.receive_notifications),
                receive_newsletter: req
                    .receive_newsletter
                    .unwrap_or(defaults.receive_newsletter),
            },
            wine_types: dedup_wine_types(&req.wine_types),
            role_name: CUSTOMER_ROLE.to_string(),
        };

        let outcome = self.customers.register(&account).await.map_err(|e| {
            tracing::error!(error = ?e, email = %email, "customer_registration_failed");
            ServiceError::Failed {
                message: "Could not create customer account",
                cause: e,
            }
        })?;
        let (user_id, customer_id) = match outcome {
            RegistrationOutcome::EmailTaken => {
                return Err(ServiceError::bad_request("Email already in use"));
            }
            RegistrationOutcome::Created {
                user_id,
                customer_id,
                role_assigned,
            } => {
                if !role_assigned {
                    tracing::warn!(%user_id, role = CUSTOMER_ROLE, "default_role_missing");
                }
                (user_id, customer_id)
            }
        };

        let token = self
            .tokens
            .issue(TokenPurpose::Access, user_id, Some(&email))?;
        tracing::info!(%user_id, %customer_id, "customer_registered");
        Ok(RegisteredCustomer {
            user_id,
            customer_id,
            email,
            access_token: token.token,
        })
    }
}

/// Issues a verification token, stores it on the user and mails the link.
/// Runs after registration has committed.
pub struct SendVerificationEmail<'a, R, T, M>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    M: Mailer + ?Sized,
{
    pub repo: &'a R,
    pub tokens: &'a T,
    pub mailer: &'a M,
}

impl<'a, R, T, M> SendVerificationEmail<'a, R, T, M>
where
    R: UserRepository + ?Sized,
    T: TokenService + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, email: &str) -> anyhow::Result<()> {
        let issued = self
            .tokens
            .issue(TokenPurpose::EmailVerification, user_id, None)?;
        self.repo
            .set_email_verification_token(user_id, Some(&issued.token))
            .await?;
        self.mailer
            .send_verification_email(email, &issued.token)
            .await
    }
}
