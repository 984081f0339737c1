use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::application::access::Guard;
use crate::application::ports::role_repository::{NewRole, RoleChanges};
use crate::application::use_cases::roles::create_role::CreateRole;
use crate::application::use_cases::roles::delete_role::DeleteRole;
use crate::application::use_cases::roles::get_roles::{GetRole, ListRoles};
use crate::application::use_cases::roles::role_permissions::{
    AddRolePermissions, RemoveRolePermissions,
};
use crate::application::use_cases::roles::update_role::UpdateRole;
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::user::RoleWithPermissions;
use crate::presentation::http::auth::{CurrentUser, MessageResponse};
use crate::presentation::http::error::{ApiResult, JsonBody, validate};
use crate::presentation::http::permissions::PermissionResponse;

const READ: Guard = Guard::admin_with(&["roles.read"]);
const CREATE: Guard = Guard::admin_with(&["roles.create"]);
const UPDATE: Guard = Guard::admin_with(&["roles.update"]);
const DELETE: Guard = Guard::admin_with(&["roles.delete"]);

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub permissions: Vec<PermissionResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<RoleWithPermissions> for RoleResponse {
    fn from(r: RoleWithPermissions) -> Self {
        RoleResponse {
            id: r.role.id,
            name: r.role.name,
            description: r.role.description,
            is_active: r.role.is_active,
            permissions: r.permissions.into_iter().map(Into::into).collect(),
            created_at: r.role.created_at,
            updated_at: r.role.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleBody {
    #[validate(length(min = 2, max = 50, message = "name must be between 2 and 50 characters"))]
    #[schema(example = "editor")]
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleBody {
    #[validate(length(min = 2, max = 50, message = "name must be between 2 and 50 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    /// Replaces the role's permissions when present.
    pub permission_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionsBody {
    #[validate(length(min = 1, message = "permissionIds should not be empty"))]
    pub permission_ids: Vec<Uuid>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/:id",
            get(get_role).patch(update_role).delete(delete_role),
        )
        .route(
            "/roles/:id/permissions",
            post(add_permissions).delete(remove_permissions),
        )
        .with_state(ctx)
}

#[utoipa::path(post, path = "/roles", tag = "Roles", request_body = CreateRoleBody,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = RoleResponse),
        (status = 409, description = "Duplicate name", body = super::error::ErrorBody)
    ))]
pub async fn create_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateRoleBody>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    CREATE.check(user.principal())?;
    validate(&body)?;
    let repo = ctx.role_repo();
    let uc = CreateRole {
        repo: repo.as_ref(),
    };
    let created = uc
        .execute(&NewRole {
            name: body.name,
            description: body.description,
            is_active: body.is_active.unwrap_or(true),
            permission_ids: body.permission_ids,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(get, path = "/roles", tag = "Roles", security(("bearer_auth" = [])),
    responses((status = 200, body = [RoleResponse])))]
pub async fn list_roles(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    READ.check(user.principal())?;
    let repo = ctx.role_repo();
    let uc = ListRoles {
        repo: repo.as_ref(),
    };
    let roles = uc.execute().await?;
    Ok(Json(roles.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/roles/{id}", tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = RoleResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn get_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoleResponse>> {
    READ.check(user.principal())?;
    let repo = ctx.role_repo();
    let uc = GetRole {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

#[utoipa::path(patch, path = "/roles/{id}", tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = UpdateRoleBody, security(("bearer_auth" = [])),
    responses(
        (status = 200, body = RoleResponse),
        (status = 404, body = super::error::ErrorBody),
        (status = 409, body = super::error::ErrorBody)
    ))]
pub async fn update_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<UpdateRoleBody>,
) -> ApiResult<Json<RoleResponse>> {
    UPDATE.check(user.principal())?;
    validate(&body)?;
    let repo = ctx.role_repo();
    let uc = UpdateRole {
        repo: repo.as_ref(),
    };
    let updated = uc
        .execute(
            id,
            &RoleChanges {
                name: body.name,
                description: body.description,
                is_active: body.is_active,
                permission_ids: body.permission_ids,
            },
        )
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(delete, path = "/roles/{id}", tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn delete_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    DELETE.check(user.principal())?;
    let repo = ctx.role_repo();
    let uc = DeleteRole {
        repo: repo.as_ref(),
    };
    uc.execute(id).await?;
    Ok(MessageResponse::new("Role deleted successfully"))
}

#[utoipa::path(post, path = "/roles/{id}/permissions", tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = RolePermissionsBody, security(("bearer_auth" = [])),
    responses((status = 200, body = RoleResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn add_permissions(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<RolePermissionsBody>,
) -> ApiResult<Json<RoleResponse>> {
    UPDATE.check(user.principal())?;
    validate(&body)?;
    let repo = ctx.role_repo();
    let uc = AddRolePermissions {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id, &body.permission_ids).await?.into()))
}

#[utoipa::path(delete, path = "/roles/{id}/permissions", tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = RolePermissionsBody, security(("bearer_auth" = [])),
    responses((status = 200, body = RoleResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn remove_permissions(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<RolePermissionsBody>,
) -> ApiResult<Json<RoleResponse>> {
    UPDATE.check(user.principal())?;
    validate(&body)?;
    let repo = ctx.role_repo();
    let uc = RemoveRolePermissions {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id, &body.permission_ids).await?.into()))
}
