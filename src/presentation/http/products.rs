use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::access::Guard;
use crate::application::ports::product_repository::{NewProduct, ProductChanges};
use crate::application::use_cases::catalog::create_product::CreateProduct;
use crate::application::use_cases::catalog::list_products::{
    CountProducts, GetProduct, ListProducts, SearchProducts,
};
use crate::application::use_cases::catalog::update_product::{
    DeleteProduct, ToggleProductStatus, UpdateProduct,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::catalog::product::Product;
use crate::domain::users::user::ADMIN_ROLE;
use crate::presentation::http::auth::{CurrentUser, MessageResponse};
use crate::presentation::http::error::{ApiResult, JsonBody, validate};

const ADMIN: Guard = Guard::roles(&[ADMIN_ROLE]);

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub vintage_year: i32,
    #[schema(value_type = Option<String>, example = "13.50")]
    pub alcohol_content: Option<Decimal>,
    pub grape_variety: Option<String>,
    pub region: Option<String>,
    /// Bottle volume in millilitres
    pub volume: Option<i32>,
    #[schema(value_type = String, example = "29.90")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub tasting_notes: Option<String>,
    pub food_pairing: Vec<String>,
    pub awards: Vec<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            category_id: p.category_id,
            vintage_year: p.vintage_year,
            alcohol_content: p.alcohol_content,
            grape_variety: p.grape_variety,
            region: p.region,
            volume: p.volume,
            price: p.price,
            image_url: p.image_url,
            images: p.images,
            tasting_notes: p.tasting_notes,
            food_pairing: p.food_pairing,
            awards: p.awards,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductBody {
    #[validate(length(min = 2, max = 200, message = "name must be between 2 and 200 characters"))]
    #[schema(example = "Gran Reserva")]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    #[schema(example = 2018)]
    pub vintage_year: i32,
    #[schema(value_type = Option<String>)]
    pub alcohol_content: Option<Decimal>,
    pub grape_variety: Option<String>,
    pub region: Option<String>,
    pub volume: Option<i32>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub tasting_notes: Option<String>,
    #[serde(default)]
    pub food_pairing: Vec<String>,
    #[serde(default)]
    pub awards: Vec<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductBody {
    #[validate(length(min = 2, max = 200, message = "name must be between 2 and 200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub vintage_year: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub alcohol_content: Option<Decimal>,
    pub grape_variety: Option<String>,
    pub region: Option<String>,
    pub volume: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub tasting_notes: Option<String>,
    pub food_pairing: Option<Vec<String>>,
    pub awards: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatusBody {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub category_id: Option<Uuid>,
    /// Defaults to `true`
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchParams {
    /// Matched against name, description, grape variety and region
    pub q: Option<String>,
    /// Comma-separated category ids
    pub category_ids: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/count", get(count_products))
        .route(
            "/products/:id",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route("/products/:id/status", patch(toggle_status))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/products", tag = "Products", request_body = CreateProductBody,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = ProductResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 403, body = super::error::ErrorBody),
        (status = 404, description = "Category not found", body = super::error::ErrorBody)
    ))]
pub async fn create_product(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateProductBody>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    ADMIN.check(user.principal())?;
    validate(&body)?;
    let products = ctx.product_repo();
    let categories = ctx.category_repo();
    let uc = CreateProduct {
        products: products.as_ref(),
        categories: categories.as_ref(),
    };
    let new_product = NewProduct {
        name: body.name.trim().to_string(),
        description: body.description,
        category_id: body.category_id,
        vintage_year: body.vintage_year,
        alcohol_content: body.alcohol_content,
        grape_variety: body.grape_variety,
        region: body.region,
        volume: body.volume,
        price: body.price,
        image_url: body.image_url,
        images: body.images,
        tasting_notes: body.tasting_notes,
        food_pairing: body.food_pairing,
        awards: body.awards,
        is_active: body.is_active.unwrap_or(true),
    };
    let created = uc.execute(&new_product, user.actor()).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(get, path = "/products", tag = "Products", params(ProductListParams),
    security(("bearer_auth" = [])),
    responses((status = 200, body = [ProductResponse])))]
pub async fn list_products(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
    Query(q): Query<ProductListParams>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let repo = ctx.product_repo();
    let uc = ListProducts {
        repo: repo.as_ref(),
    };
    let items = uc.execute(q.category_id, q.is_active).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/products/search", tag = "Products", params(ProductSearchParams),
    security(("bearer_auth" = [])),
    responses((status = 200, body = [ProductResponse]), (status = 400, body = super::error::ErrorBody)))]
pub async fn search_products(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
    Query(q): Query<ProductSearchParams>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let repo = ctx.product_repo();
    let uc = SearchProducts {
        repo: repo.as_ref(),
    };
    let items = uc
        .execute(q.q.as_deref(), q.category_ids.as_deref())
        .await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/products/count", tag = "Products", security(("bearer_auth" = [])),
    responses((status = 200, body = CountResponse), (status = 403, body = super::error::ErrorBody)))]
pub async fn count_products(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Json<CountResponse>> {
    ADMIN.check(user.principal())?;
    let repo = ctx.product_repo();
    let uc = CountProducts {
        repo: repo.as_ref(),
    };
    Ok(Json(CountResponse {
        count: uc.execute().await?,
    }))
}

#[utoipa::path(get, path = "/products/{id}", tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = ProductResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn get_product(
    State(ctx): State<AppContext>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductResponse>> {
    let repo = ctx.product_repo();
    let uc = GetProduct {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

#[utoipa::path(patch, path = "/products/{id}", tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductBody, security(("bearer_auth" = [])),
    responses(
        (status = 200, body = ProductResponse),
        (status = 400, body = super::error::ErrorBody),
        (status = 404, body = super::error::ErrorBody)
    ))]
pub async fn update_product(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<UpdateProductBody>,
) -> ApiResult<Json<ProductResponse>> {
    ADMIN.check(user.principal())?;
    validate(&body)?;
    let products = ctx.product_repo();
    let categories = ctx.category_repo();
    let uc = UpdateProduct {
        products: products.as_ref(),
        categories: categories.as_ref(),
    };
    let changes = ProductChanges {
        name: body.name.map(|n| n.trim().to_string()),
        description: body.description,
        category_id: body.category_id,
        vintage_year: body.vintage_year,
        alcohol_content: body.alcohol_content,
        grape_variety: body.grape_variety,
        region: body.region,
        volume: body.volume,
        price: body.price,
        image_url: body.image_url,
        images: body.images,
        tasting_notes: body.tasting_notes,
        food_pairing: body.food_pairing,
        awards: body.awards,
        is_active: body.is_active,
    };
    Ok(Json(uc.execute(id, &changes).await?.into()))
}

#[utoipa::path(delete, path = "/products/{id}", tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    security(("bearer_auth" = [])),
    responses((status = 200, body = MessageResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn delete_product(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    ADMIN.check(user.principal())?;
    let repo = ctx.product_repo();
    let uc = DeleteProduct {
        repo: repo.as_ref(),
    };
    uc.execute(id).await?;
    Ok(MessageResponse::new("Product deleted successfully"))
}

#[utoipa::path(patch, path = "/products/{id}/status", tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductStatusBody, security(("bearer_auth" = [])),
    responses((status = 200, body = ProductResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn toggle_status(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<ProductStatusBody>,
) -> ApiResult<Json<ProductResponse>> {
    ADMIN.check(user.principal())?;
    let repo = ctx.product_repo();
    let uc = ToggleProductStatus {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id, body.is_active).await?.into()))
}
