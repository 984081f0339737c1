use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::access::{self, Guard};
use crate::application::use_cases::users::create_user::{CreateUser, CreateUserRequest};
use crate::application::use_cases::users::delete_user::{DeleteUser, RestoreUser};
use crate::application::use_cases::users::get_user::GetUser;
use crate::application::use_cases::users::list_users::{ListUsers, UserListQuery};
use crate::application::use_cases::users::update_user::{UpdateUser, UpdateUserRequest};
use crate::application::use_cases::users::user_roles::{AssignRoles, RemoveRoles, UsersByRole};
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::user::User;
use crate::presentation::http::auth::{CurrentUser, MessageResponse, signup_password};
use crate::presentation::http::error::{ApiResult, JsonBody, validate};
use crate::presentation::http::roles::RoleResponse;

const READ: Guard = Guard::admin_with(&["users.read"]);
const CREATE: Guard = Guard::admin_with(&["users.create"]);
const UPDATE: Guard = Guard::admin_with(&["users.update"]);
const DELETE: Guard = Guard::admin_with(&["users.delete"]);

/// Public view of an account; credentials and pending tokens never leave the server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_email_verified: bool,
    pub avatar: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        UserResponse {
            id: u.id,
            email: u.email.clone(),
            name: u.name.clone(),
            is_email_verified: u.is_email_verified,
            avatar: u.avatar.clone(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithRolesResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub roles: Vec<RoleResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Page size, 1 to 100
    pub limit: Option<i64>,
    /// Substring match on the email
    pub email: Option<String>,
    /// Substring match on the name
    pub name: Option<String>,
    pub is_email_verified: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserBody {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(custom(function = "signup_password"))]
    pub password: String,
    #[validate(length(min = 2, max = 50, message = "name must be longer than or equal to 2 characters"))]
    pub name: Option<String>,
    /// Role granted on creation, by name.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    #[validate(length(min = 2, max = 50, message = "name must be longer than or equal to 2 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be an email"))]
    pub email: Option<String>,
    #[validate(custom(function = "signup_password"))]
    pub password: Option<String>,
    pub avatar: Option<String>,
    /// Only honored for administrators.
    pub is_email_verified: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleIdsBody {
    #[validate(length(min = 1, message = "roleIds should not be empty"))]
    pub role_ids: Vec<Uuid>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/role/:role_name", get(users_by_role))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/:id/restore", post(restore_user))
        .route(
            "/users/:id/roles",
            post(assign_roles).delete(remove_roles),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/users", tag = "Users", params(UserListParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = UserListResponse),
        (status = 401, body = super::error::ErrorBody),
        (status = 403, body = super::error::ErrorBody)
    ))]
pub async fn list_users(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(q): Query<UserListParams>,
) -> ApiResult<Json<UserListResponse>> {
    READ.check(user.principal())?;
    let repo = ctx.user_repo();
    let uc = ListUsers {
        repo: repo.as_ref(),
    };
    let page = uc
        .execute(&UserListQuery {
            page: q.page,
            limit: q.limit,
            email: q.email,
            name: q.name,
            is_email_verified: q.is_email_verified,
        })
        .await?;
    Ok(Json(UserListResponse {
        users: page.users.iter().map(UserResponse::from).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages,
    }))
}

#[utoipa::path(get, path = "/users/{id}", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = UserWithRolesResponse),
        (status = 403, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn get_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserWithRolesResponse>> {
    access::require_self_or_admin(user.principal(), id)?;
    let repo = ctx.user_repo();
    let uc = GetUser {
        repo: repo.as_ref(),
    };
    let detail = uc.execute(id).await?;
    Ok(Json(UserWithRolesResponse {
        user: UserResponse::from(&detail.user),
        roles: detail.roles.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(post, path = "/users", tag = "Users", request_body = CreateUserBody,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = UserResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 409, description = "Email already registered", body = super::error::ErrorBody)
    ))]
pub async fn create_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateUserBody>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    CREATE.check(user.principal())?;
    validate(&body)?;
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let hasher = ctx.password_hasher();
    let uc = CreateUser {
        users: users.as_ref(),
        roles: roles.as_ref(),
        hasher: hasher.as_ref(),
    };
    let created = uc
        .execute(&CreateUserRequest {
            email: body.email,
            password: body.password,
            name: body.name,
            role: body.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&created))))
}

#[utoipa::path(patch, path = "/users/{id}", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserBody, security(("bearer_auth" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 403, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody),
        (status = 409, body = super::error::ErrorBody)
    ))]
pub async fn update_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<UpdateUserBody>,
) -> ApiResult<Json<UserResponse>> {
    validate(&body)?;
    let repo = ctx.user_repo();
    let hasher = ctx.password_hasher();
    let uc = UpdateUser {
        repo: repo.as_ref(),
        hasher: hasher.as_ref(),
    };
    let updated = uc
        .execute(
            user.principal(),
            id,
            &UpdateUserRequest {
                name: body.name,
                email: body.email,
                password: body.password,
                avatar: body.avatar,
                is_email_verified: body.is_email_verified,
            },
        )
        .await?;
    Ok(Json(UserResponse::from(&updated)))
}

#[utoipa::path(delete, path = "/users/{id}", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn delete_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    DELETE.check(user.principal())?;
    let repo = ctx.user_repo();
    let uc = DeleteUser {
        repo: repo.as_ref(),
    };
    uc.execute(id).await?;
    Ok(MessageResponse::new("User deleted successfully"))
}

#[utoipa::path(post, path = "/users/{id}/restore", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn restore_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    UPDATE.check(user.principal())?;
    let repo = ctx.user_repo();
    let uc = RestoreUser {
        repo: repo.as_ref(),
    };
    uc.execute(id).await?;
    Ok(MessageResponse::new("User restored successfully"))
}

#[utoipa::path(post, path = "/users/{id}/roles", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = RoleIdsBody, security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [RoleResponse]),
        (status = 404, description = "User or roles not found", body = super::error::ErrorBody)
    ))]
pub async fn assign_roles(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<RoleIdsBody>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    UPDATE.check(user.principal())?;
    validate(&body)?;
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let uc = AssignRoles {
        users: users.as_ref(),
        roles: roles.as_ref(),
    };
    let granted = uc.execute(id, &body.role_ids).await?;
    Ok(Json(granted.into_iter().map(Into::into).collect()))
}

#[utoipa::path(delete, path = "/users/{id}/roles", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = RoleIdsBody, security(("bearer_auth" = [])),
    responses((status = 200, body = [RoleResponse]), (status = 404, body = super::error::ErrorBody)))]
pub async fn remove_roles(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<RoleIdsBody>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    UPDATE.check(user.principal())?;
    validate(&body)?;
    let users = ctx.user_repo();
    let uc = RemoveRoles {
        users: users.as_ref(),
    };
    let remaining = uc.execute(id, &body.role_ids).await?;
    Ok(Json(remaining.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/users/role/{role_name}", tag = "Users",
    params(("role_name" = String, Path, description = "Role name")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = [UserResponse])))]
pub async fn users_by_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(role_name): Path<String>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    READ.check(user.principal())?;
    let users = ctx.user_repo();
    let uc = UsersByRole {
        users: users.as_ref(),
    };
    let found = uc.execute(&role_name).await?;
    Ok(Json(found.iter().map(UserResponse::from).collect()))
}
