use axum::{Json, Router, extract::State, routing::get};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::use_cases::customers::my_account::{
    GetMyAccount, PreferencesUpdate, UpdateMyPreferences,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::customers::customer::{CustomerAccount, WineType};
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiResult, JsonBody};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfileResponse {
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccountResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_code: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub profile: Option<CustomerProfileResponse>,
    pub receive_notifications: bool,
    pub receive_newsletter: bool,
    #[schema(example = json!(["red", "sparkling"]))]
    pub wine_types: Vec<String>,
}

impl From<CustomerAccount> for CustomerAccountResponse {
    fn from(a: CustomerAccount) -> Self {
        CustomerAccountResponse {
            id: a.customer.id,
            user_id: a.customer.user_id,
            customer_code: a.customer.customer_code,
            created_at: a.customer.created_at,
            profile: a.profile.map(|p| CustomerProfileResponse {
                phone: p.phone,
                birth_date: p.birth_date,
            }),
            receive_notifications: a.communication.receive_notifications,
            receive_newsletter: a.communication.receive_newsletter,
            wine_types: a.wine_types.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesBody {
    pub notifications: Option<bool>,
    pub newsletter: Option<bool>,
    /// Replaces the stored wine types when present.
    pub wine_types: Option<Vec<String>>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/customers/me", get(get_my_account))
        .route(
            "/customers/me/preferences",
            axum::routing::put(update_my_preferences),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/customers/me", tag = "Customers", security(("bearer_auth" = [])),
    responses(
        (status = 200, body = CustomerAccountResponse),
        (status = 404, description = "Caller has no customer record", body = super::error::ErrorBody)
    ))]
pub async fn get_my_account(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Json<CustomerAccountResponse>> {
    let repo = ctx.customer_repo();
    let uc = GetMyAccount {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(user.id()).await?.into()))
}

#[utoipa::path(put, path = "/customers/me/preferences", tag = "Customers",
    request_body = PreferencesBody, security(("bearer_auth" = [])),
    responses(
        (status = 200, body = CustomerAccountResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn update_my_preferences(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(body): JsonBody<PreferencesBody>,
) -> ApiResult<Json<CustomerAccountResponse>> {
    let wine_types = match body.wine_types {
        Some(raw) => Some(
            raw.iter()
                .map(|s| s.parse::<WineType>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| {
                    ServiceError::Validation(vec![
                        "each value in wineTypes must be one of: white, rose, sparkling, red"
                            .into(),
                    ])
                })?,
        ),
        None => None,
    };
    let repo = ctx.customer_repo();
    let uc = UpdateMyPreferences {
        repo: repo.as_ref(),
    };
    let update = PreferencesUpdate {
        receive_notifications: body.notifications,
        receive_newsletter: body.newsletter,
        wine_types,
    };
    Ok(Json(uc.execute(user.id(), &update).await?.into()))
}
