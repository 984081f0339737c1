use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::access::Guard;
use crate::application::ports::permission_repository::{NewPermission, PermissionChanges};
use crate::application::use_cases::permissions::create_permission::CreatePermission;
use crate::application::use_cases::permissions::delete_permission::DeletePermission;
use crate::application::use_cases::permissions::get_permissions::{
    GetPermission, ListPermissions,
};
use crate::application::use_cases::permissions::update_permission::UpdatePermission;
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::user::Permission;
use crate::presentation::http::auth::{CurrentUser, MessageResponse};
use crate::presentation::http::error::{ApiResult, JsonBody, validate};

const READ: Guard = Guard::admin_with(&["permissions.read"]);
const CREATE: Guard = Guard::admin_with(&["permissions.create"]);
const UPDATE: Guard = Guard::admin_with(&["permissions.update"]);
const DELETE: Guard = Guard::admin_with(&["permissions.delete"]);

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub module: String,
    pub action: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Permission> for PermissionResponse {
    fn from(p: Permission) -> Self {
        PermissionResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            module: p.module,
            action: p.action,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionBody {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    #[schema(example = "products.read")]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "module should not be empty"))]
    pub module: String,
    #[validate(length(min = 1, message = "action should not be empty"))]
    pub action: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePermissionBody {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "module should not be empty"))]
    pub module: Option<String>,
    #[validate(length(min = 1, message = "action should not be empty"))]
    pub action: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PermissionQuery {
    /// Restrict to one module, e.g. `products`
    pub module: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/permissions", get(list_permissions).post(create_permission))
        .route(
            "/permissions/:id",
            get(get_permission)
                .patch(update_permission)
                .delete(delete_permission),
        )
        .with_state(ctx)
}

#[utoipa::path(post, path = "/permissions", tag = "Permissions", request_body = CreatePermissionBody,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = PermissionResponse),
        (status = 409, description = "Duplicate name", body = super::error::ErrorBody)
    ))]
pub async fn create_permission(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreatePermissionBody>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    CREATE.check(user.principal())?;
    validate(&body)?;
    let repo = ctx.permission_repo();
    let uc = CreatePermission {
        repo: repo.as_ref(),
    };
    let created = uc
        .execute(&NewPermission {
            name: body.name,
            description: body.description,
            module: body.module,
            action: body.action,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(get, path = "/permissions", tag = "Permissions", params(PermissionQuery),
    security(("bearer_auth" = [])),
    responses((status = 200, body = [PermissionResponse])))]
pub async fn list_permissions(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(q): Query<PermissionQuery>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    READ.check(user.principal())?;
    let repo = ctx.permission_repo();
    let uc = ListPermissions {
        repo: repo.as_ref(),
    };
    let items = uc.execute(q.module.as_deref()).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/permissions/{id}", tag = "Permissions",
    params(("id" = Uuid, Path, description = "Permission id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = PermissionResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn get_permission(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PermissionResponse>> {
    READ.check(user.principal())?;
    let repo = ctx.permission_repo();
    let uc = GetPermission {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

#[utoipa::path(patch, path = "/permissions/{id}", tag = "Permissions",
    params(("id" = Uuid, Path, description = "Permission id")),
    request_body = UpdatePermissionBody, security(("bearer_auth" = [])),
    responses(
        (status = 200, body = PermissionResponse),
        (status = 404, body = super::error::ErrorBody),
        (status = 409, body = super::error::ErrorBody)
    ))]
pub async fn update_permission(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<UpdatePermissionBody>,
) -> ApiResult<Json<PermissionResponse>> {
    UPDATE.check(user.principal())?;
    validate(&body)?;
    let repo = ctx.permission_repo();
    let uc = UpdatePermission {
        repo: repo.as_ref(),
    };
    let updated = uc
        .execute(
            id,
            &PermissionChanges {
                name: body.name,
                description: body.description,
                module: body.module,
                action: body.action,
            },
        )
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(delete, path = "/permissions/{id}", tag = "Permissions",
    params(("id" = Uuid, Path, description = "Permission id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn delete_permission(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    DELETE.check(user.principal())?;
    let repo = ctx.permission_repo();
    let uc = DeletePermission {
        repo: repo.as_ref(),
    };
    uc.execute(id).await?;
    Ok(MessageResponse::new("Permission deleted successfully"))
}
