use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::application::access::Principal;
use crate::application::error::ServiceError;
use crate::application::use_cases::auth::authenticate::{Authenticate, Session};
use crate::application::use_cases::auth::change_password::{
    ChangePassword, ChangePasswordRequest,
};
use crate::application::use_cases::auth::forgot_password::ForgotPassword;
use crate::application::use_cases::auth::login::{Login, LoginRequest};
use crate::application::use_cases::auth::logout::Logout;
use crate::application::use_cases::auth::profile::{GetProfile, ProfileChanges, UpdateProfile};
use crate::application::use_cases::auth::register_customer::{
    RegisterCustomer, RegisterCustomerRequest, SendVerificationEmail,
};
use crate::application::use_cases::auth::reset_password::ResetPassword;
use crate::application::use_cases::auth::verify_email::VerifyEmail;
use crate::bootstrap::app_context::AppContext;
use crate::domain::customers::customer::WineType;
use crate::domain::users::password::{
    MAX_LEN, is_acceptable_signup_password, is_strong_password,
};
use crate::presentation::http::error::{ApiError, ApiResult, JsonBody, validate};
use crate::presentation::http::users::UserResponse;

pub(crate) static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()-]{6,19}$").expect("valid phone regex"));

pub(crate) fn signup_password(value: &str) -> Result<(), ValidationError> {
    if is_acceptable_signup_password(value) {
        Ok(())
    } else {
        Err(ValidationError::new("password").with_message("password too weak".into()))
    }
}

fn profile_password(value: &str) -> Result<(), ValidationError> {
    if is_strong_password(value) && value.chars().count() <= MAX_LEN {
        Ok(())
    } else {
        Err(ValidationError::new("password").with_message("password too weak".into()))
    }
}

fn new_password(value: &str) -> Result<(), ValidationError> {
    if is_strong_password(value) {
        Ok(())
    } else {
        Err(ValidationError::new("password").with_message(
            "The password must contain at least one uppercase letter, one lowercase letter, one number, and one special character."
                .into(),
        ))
    }
}

/// Raw token from `Authorization: Bearer <jwt>`.
pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Bearer(t.to_string()))
            .ok_or_else(|| ServiceError::unauthorized("Unauthorized").into())
    }
}

/// Authenticated caller: token checked against the blacklist, signature
/// verified and roles loaded.
pub struct CurrentUser(pub Session);

impl CurrentUser {
    pub fn principal(&self) -> &Principal {
        &self.0.principal
    }

    pub fn id(&self) -> Uuid {
        self.0.principal.id()
    }

    /// Name recorded in audit columns for writes made by this caller.
    pub fn actor(&self) -> &str {
        self.0.principal.user.display_name()
    }
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Bearer(token) = Bearer::from_request_parts(parts, ctx).await?;
        let repo = ctx.user_repo();
        let tokens = ctx.token_service();
        let blacklist = ctx.token_blacklist();
        let uc = Authenticate {
            repo: repo.as_ref(),
            tokens: tokens.as_ref(),
            blacklist: blacklist.as_ref(),
        };
        Ok(CurrentUser(uc.execute(&token).await?))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPreferencesBody {
    #[serde(default)]
    #[schema(example = json!(["red", "white"]))]
    pub wine_types: Vec<String>,
    pub notifications: Option<bool>,
    pub newsletter: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerBody {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(custom(function = "signup_password"))]
    pub password: String,
    #[validate(length(
        min = 2,
        max = 50,
        message = "name must be between 2 and 50 characters"
    ))]
    pub name: String,
    #[validate(regex(path = *PHONE_RE, message = "phone must be a valid phone number"))]
    pub phone: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub preferences: Option<CustomerPreferencesBody>,
}

impl RegisterCustomerBody {
    fn into_request(self) -> ApiResult<RegisterCustomerRequest> {
        let mut problems = Vec::new();
        let birth_date = match self.birth_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    problems.push("birthDate must be a valid ISO 8601 date string".to_string());
                    None
                }
            },
        };
        let prefs = self.preferences.unwrap_or(CustomerPreferencesBody {
            wine_types: Vec::new(),
            notifications: None,
            newsletter: None,
        });
        let mut wine_types = Vec::with_capacity(prefs.wine_types.len());
        for raw in &prefs.wine_types {
            match raw.parse::<WineType>() {
                Ok(w) => wine_types.push(w),
                Err(_) => problems.push(
                    "each value in wineTypes must be one of: white, rose, sparkling, red"
                        .to_string(),
                ),
            }
        }
        if !problems.is_empty() {
            return Err(ServiceError::Validation(problems).into());
        }
        Ok(RegisterCustomerRequest {
            email: self.email,
            password: self.password,
            name: self.name,
            phone: self.phone,
            birth_date,
            wine_types,
            receive_notifications: prefs.notifications,
            receive_newsletter: prefs.newsletter,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginBody {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub message: String,
    pub token_expires_in: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordBody {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    #[validate(length(min = 1, message = "token should not be empty"))]
    pub token: String,
    #[validate(custom(function = "signup_password"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyEmailQuery {
    /// Email verification token
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileBody {
    #[validate(length(
        min = 2,
        max = 50,
        message = "name must be between 2 and 50 characters"
    ))]
    pub name: Option<String>,
    #[validate(email(message = "email must be an email"))]
    pub email: Option<String>,
    #[validate(custom(function = "profile_password"))]
    pub password: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    pub current_password: String,
    #[validate(
        length(min = 8, message = "newPassword must be longer than or equal to 8 characters"),
        custom(function = "new_password")
    )]
    pub new_password: String,
    pub confirm_password: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register/customer", post(register_customer))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/verify-email", get(verify_email))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/password", put(change_password))
        .with_state(ctx)
}

fn spawn_verification_email(ctx: &AppContext, user_id: Uuid, email: String) {
    let repo = ctx.user_repo();
    let tokens = ctx.token_service();
    let mailer = ctx.mailer();
    tokio::spawn(async move {
        let uc = SendVerificationEmail {
            repo: repo.as_ref(),
            tokens: tokens.as_ref(),
            mailer: mailer.as_ref(),
        };
        if let Err(e) = uc.execute(user_id, &email).await {
            tracing::error!(error = ?e, %user_id, "verification_email_failed");
        }
    });
}

#[utoipa::path(post, path = "/auth/register/customer", tag = "Auth",
    request_body = RegisterCustomerBody, security(()),
    responses(
        (status = 201, description = "Customer registered", body = AccessTokenResponse),
        (status = 400, description = "Email already in use or invalid data", body = super::error::ErrorBody)
    ))]
pub async fn register_customer(
    State(ctx): State<AppContext>,
    JsonBody(body): JsonBody<RegisterCustomerBody>,
) -> ApiResult<(StatusCode, Json<AccessTokenResponse>)> {
    validate(&body)?;
    let req = body.into_request()?;
    let customers = ctx.customer_repo();
    let hasher = ctx.password_hasher();
    let tokens = ctx.token_service();
    let uc = RegisterCustomer {
        customers: customers.as_ref(),
        hasher: hasher.as_ref(),
        tokens: tokens.as_ref(),
    };
    let registered = uc.execute(&req).await?;
    spawn_verification_email(&ctx, registered.user_id, registered.email);
    Ok((
        StatusCode::CREATED,
        Json(AccessTokenResponse {
            access_token: registered.access_token,
        }),
    ))
}

#[utoipa::path(post, path = "/auth/login", tag = "Auth", request_body = LoginBody, security(()),
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Invalid credentials or unverified email", body = super::error::ErrorBody)
    ))]
pub async fn login(
    State(ctx): State<AppContext>,
    JsonBody(body): JsonBody<LoginBody>,
) -> ApiResult<Json<LoginResponse>> {
    validate(&body)?;
    let repo = ctx.user_repo();
    let hasher = ctx.password_hasher();
    let tokens = ctx.token_service();
    let uc = Login {
        repo: repo.as_ref(),
        hasher: hasher.as_ref(),
        tokens: tokens.as_ref(),
    };
    let outcome = uc
        .execute(&LoginRequest {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        user: UserResponse::from(&outcome.user),
        token: outcome.token.token,
    }))
}

#[utoipa::path(post, path = "/auth/logout", tag = "Auth", security(("bearer_auth" = [])),
    responses((status = 200, body = LogoutResponse), (status = 401, body = super::error::ErrorBody)))]
pub async fn logout(State(ctx): State<AppContext>, user: CurrentUser) -> Json<LogoutResponse> {
    let blacklist = ctx.token_blacklist();
    let uc = Logout {
        blacklist: blacklist.as_ref(),
    };
    let outcome = uc.execute(&user.0);
    Json(LogoutResponse {
        message: "Logout successful".into(),
        token_expires_in: format!("{} seconds remaining", outcome.seconds_remaining),
    })
}

#[utoipa::path(post, path = "/auth/forgot-password", tag = "Auth",
    request_body = ForgotPasswordBody, security(()),
    responses((status = 200, description = "Recovery email sent if the account exists", body = MessageResponse)))]
pub async fn forgot_password(
    State(ctx): State<AppContext>,
    JsonBody(body): JsonBody<ForgotPasswordBody>,
) -> ApiResult<Json<MessageResponse>> {
    validate(&body)?;
    let repo = ctx.user_repo();
    let tokens = ctx.token_service();
    let mailer = ctx.mailer();
    let uc = ForgotPassword {
        repo: repo.as_ref(),
        tokens: tokens.as_ref(),
        mailer: mailer.as_ref(),
    };
    uc.execute(&body.email).await?;
    Ok(MessageResponse::new(
        "If the email is registered, a recovery link has been sent",
    ))
}

#[utoipa::path(post, path = "/auth/reset-password", tag = "Auth",
    request_body = ResetPasswordBody, security(()),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = super::error::ErrorBody)
    ))]
pub async fn reset_password(
    State(ctx): State<AppContext>,
    JsonBody(body): JsonBody<ResetPasswordBody>,
) -> ApiResult<Json<MessageResponse>> {
    validate(&body)?;
    let repo = ctx.user_repo();
    let tokens = ctx.token_service();
    let hasher = ctx.password_hasher();
    let uc = ResetPassword {
        repo: repo.as_ref(),
        tokens: tokens.as_ref(),
        hasher: hasher.as_ref(),
    };
    uc.execute(&body.token, &body.new_password).await?;
    Ok(MessageResponse::new("Password changed successfully"))
}

#[utoipa::path(get, path = "/auth/verify-email", tag = "Auth", params(VerifyEmailQuery), security(()),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = super::error::ErrorBody)
    ))]
pub async fn verify_email(
    State(ctx): State<AppContext>,
    Query(q): Query<VerifyEmailQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let repo = ctx.user_repo();
    let tokens = ctx.token_service();
    let uc = VerifyEmail {
        repo: repo.as_ref(),
        tokens: tokens.as_ref(),
    };
    uc.execute(q.token.as_deref().unwrap_or_default()).await?;
    Ok(MessageResponse::new("Email successfully verified"))
}

#[utoipa::path(get, path = "/auth/profile", tag = "Auth", security(("bearer_auth" = [])),
    responses((status = 200, body = UserResponse), (status = 401, body = super::error::ErrorBody)))]
pub async fn get_profile(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    let repo = ctx.user_repo();
    let uc = GetProfile {
        repo: repo.as_ref(),
    };
    let profile = uc.execute(user.id()).await?;
    Ok(Json(UserResponse::from(&profile)))
}

#[utoipa::path(put, path = "/auth/profile", tag = "Auth", request_body = UpdateProfileBody,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 409, description = "Email taken by another account", body = super::error::ErrorBody)
    ))]
pub async fn update_profile(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(body): JsonBody<UpdateProfileBody>,
) -> ApiResult<Json<UserResponse>> {
    validate(&body)?;
    let repo = ctx.user_repo();
    let hasher = ctx.password_hasher();
    let uc = UpdateProfile {
        repo: repo.as_ref(),
        hasher: hasher.as_ref(),
    };
    let updated = uc
        .execute(
            user.id(),
            &ProfileChanges {
                name: body.name,
                email: body.email,
                password: body.password,
                avatar: body.avatar,
            },
        )
        .await?;
    Ok(Json(UserResponse::from(&updated)))
}

#[utoipa::path(put, path = "/auth/profile/password", tag = "Auth", request_body = ChangePasswordBody,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn change_password(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(body): JsonBody<ChangePasswordBody>,
) -> ApiResult<Json<MessageResponse>> {
    validate(&body)?;
    let repo = ctx.user_repo();
    let hasher = ctx.password_hasher();
    let uc = ChangePassword {
        repo: repo.as_ref(),
        hasher: hasher.as_ref(),
    };
    uc.execute(
        user.id(),
        &ChangePasswordRequest {
            current_password: body.current_password,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
        },
    )
    .await?;
    Ok(MessageResponse::new("Password updated successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> RegisterCustomerBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn registration_body_parses_preferences() {
        let req = body(serde_json::json!({
            "email": "ana@example.com",
            "password": "Password1",
            "name": "Ana",
            "birthDate": "1990-01-31",
            "preferences": {"wineTypes": ["red", "rose"], "newsletter": true}
        }))
        .into_request()
        .unwrap();
        assert_eq!(req.wine_types, vec![WineType::Red, WineType::Rose]);
        assert_eq!(req.birth_date, NaiveDate::from_ymd_opt(1990, 1, 31));
        assert_eq!(req.receive_newsletter, Some(true));
        assert_eq!(req.receive_notifications, None);
    }

    #[test]
    fn registration_body_rejects_unknown_wine_and_bad_date() {
        let Err(ApiError(ServiceError::Validation(problems))) = body(serde_json::json!({
            "email": "ana@example.com",
            "password": "Password1",
            "name": "Ana",
            "birthDate": "31/01/1990",
            "preferences": {"wineTypes": ["orange"]}
        }))
        .into_request() else {
            panic!("expected validation failure");
        };
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn registration_body_validates_fields() {
        let dto = body(serde_json::json!({
            "email": "not-an-email",
            "password": "weakpass",
            "name": "A",
            "phone": "call me"
        }));
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["email", "password", "name", "phone"] {
            assert!(fields.contains_key(field), "{field}");
        }
    }

    #[test]
    fn password_policies_differ_between_signup_and_profile() {
        assert!(signup_password("Password1").is_ok());
        assert!(profile_password("Password1").is_err());
        assert!(profile_password("Password1!").is_ok());
        assert!(new_password("Password1!Password1!Long").is_ok());
        assert!(profile_password("Password1!Password1!Long").is_err());
    }
}
