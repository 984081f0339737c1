use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::application::access::Guard;
use crate::application::error::ServiceError;
use crate::application::ports::inventory_repository::{
    InventoryChange, InventoryLevels, NewStockMovement,
};
use crate::application::use_cases::inventory::movements::{ListMovements, RecordMovement};
use crate::application::use_cases::inventory::stock_levels::{
    GetInventory, LowStock, OutOfStock, UpdateInventory,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::inventory::stock::{Inventory, StockMovement, StockMovementKind};
use crate::domain::users::user::ADMIN_ROLE;
use crate::presentation::http::auth::CurrentUser;
use crate::presentation::http::error::{ApiResult, JsonBody, validate};

const ADMIN: Guard = Guard::roles(&[ADMIN_ROLE]);

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub current_stock: i32,
    pub reserved_stock: i32,
    pub minimum_stock: i32,
    pub maximum_stock: i32,
    pub last_updated: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<String>,
}

impl From<Inventory> for InventoryResponse {
    fn from(i: Inventory) -> Self {
        InventoryResponse {
            id: i.id,
            product_id: i.product_id,
            current_stock: i.current_stock,
            reserved_stock: i.reserved_stock,
            minimum_stock: i.minimum_stock,
            maximum_stock: i.maximum_stock,
            last_updated: i.last_updated,
            updated_by: i.updated_by,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockMovementResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    #[serde(rename = "type")]
    #[schema(example = "in")]
    pub kind: String,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reason: Option<String>,
    pub reference_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub created_by: Option<String>,
}

impl From<StockMovement> for StockMovementResponse {
    fn from(m: StockMovement) -> Self {
        StockMovementResponse {
            id: m.id,
            product_id: m.product_id,
            kind: m.kind.as_str().to_string(),
            quantity: m.quantity,
            previous_stock: m.previous_stock,
            new_stock: m.new_stock,
            reason: m.reason,
            reference_id: m.reference_id,
            created_at: m.created_at,
            created_by: m.created_by,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryChangeResponse {
    pub inventory: InventoryResponse,
    pub movement: Option<StockMovementResponse>,
}

impl From<InventoryChange> for InventoryChangeResponse {
    fn from(c: InventoryChange) -> Self {
        InventoryChangeResponse {
            inventory: c.inventory.into(),
            movement: c.movement.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryBody {
    #[validate(range(min = 0, message = "current_stock must not be negative"))]
    pub current_stock: Option<i32>,
    #[validate(range(min = 0, message = "minimum_stock must not be negative"))]
    pub minimum_stock: Option<i32>,
    #[validate(range(min = 0, message = "maximum_stock must not be negative"))]
    pub maximum_stock: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockMovementBody {
    /// One of `in`, `out`, `adjustment`, `reserved`, `released`
    #[serde(rename = "type")]
    #[schema(example = "in")]
    pub kind: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(max = 200, message = "reason must be at most 200 characters"))]
    pub reason: Option<String>,
    pub reference_id: Option<Uuid>,
}

impl StockMovementBody {
    fn into_movement(self) -> ApiResult<NewStockMovement> {
        let kind = self
            .kind
            .parse::<StockMovementKind>()
            .map_err(|e| ServiceError::bad_request(e.to_string()))?;
        Ok(NewStockMovement {
            kind,
            quantity: self.quantity,
            reason: self.reason,
            reference_id: self.reference_id,
        })
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/inventory/low-stock", get(low_stock))
        .route("/inventory/out-of-stock", get(out_of_stock))
        .route(
            "/inventory/product/:product_id",
            get(get_inventory).put(update_inventory),
        )
        .route(
            "/inventory/product/:product_id/movements",
            get(list_movements).post(record_movement),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/inventory/product/{product_id}", tag = "Inventory",
    params(("product_id" = Uuid, Path, description = "Product id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = InventoryResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn get_inventory(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<InventoryResponse>> {
    ADMIN.check(user.principal())?;
    let repo = ctx.inventory_repo();
    let uc = GetInventory {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(product_id).await?.into()))
}

#[utoipa::path(put, path = "/inventory/product/{product_id}", tag = "Inventory",
    params(("product_id" = Uuid, Path, description = "Product id")),
    request_body = UpdateInventoryBody, security(("bearer_auth" = [])),
    responses(
        (status = 200, body = InventoryChangeResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn update_inventory(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
    JsonBody(body): JsonBody<UpdateInventoryBody>,
) -> ApiResult<Json<InventoryChangeResponse>> {
    ADMIN.check(user.principal())?;
    validate(&body)?;
    let repo = ctx.inventory_repo();
    let uc = UpdateInventory {
        repo: repo.as_ref(),
    };
    let levels = InventoryLevels {
        current_stock: body.current_stock,
        minimum_stock: body.minimum_stock,
        maximum_stock: body.maximum_stock,
    };
    let change = uc.execute(product_id, &levels, user.actor()).await?;
    Ok(Json(change.into()))
}

#[utoipa::path(post, path = "/inventory/product/{product_id}/movements", tag = "Inventory",
    params(("product_id" = Uuid, Path, description = "Product id")),
    request_body = StockMovementBody, security(("bearer_auth" = [])),
    responses(
        (status = 201, body = InventoryChangeResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn record_movement(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
    JsonBody(body): JsonBody<StockMovementBody>,
) -> ApiResult<(StatusCode, Json<InventoryChangeResponse>)> {
    ADMIN.check(user.principal())?;
    validate(&body)?;
    let movement = body.into_movement()?;
    let repo = ctx.inventory_repo();
    let uc = RecordMovement {
        repo: repo.as_ref(),
    };
    let change = uc.execute(product_id, &movement, user.actor()).await?;
    Ok((StatusCode::CREATED, Json(change.into())))
}

#[utoipa::path(get, path = "/inventory/product/{product_id}/movements", tag = "Inventory",
    params(("product_id" = Uuid, Path, description = "Product id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Newest first", body = [StockMovementResponse])))]
pub async fn list_movements(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<Vec<StockMovementResponse>>> {
    ADMIN.check(user.principal())?;
    let repo = ctx.inventory_repo();
    let uc = ListMovements {
        repo: repo.as_ref(),
    };
    let items = uc.execute(product_id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/inventory/low-stock", tag = "Inventory",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [InventoryResponse])))]
pub async fn low_stock(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<InventoryResponse>>> {
    ADMIN.check(user.principal())?;
    let repo = ctx.inventory_repo();
    let uc = LowStock {
        repo: repo.as_ref(),
    };
    let items = uc.execute().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/inventory/out-of-stock", tag = "Inventory",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [InventoryResponse])))]
pub async fn out_of_stock(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<InventoryResponse>>> {
    ADMIN.check(user.principal())?;
    let repo = ctx.inventory_repo();
    let uc = OutOfStock {
        repo: repo.as_ref(),
    };
    let items = uc.execute().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}
