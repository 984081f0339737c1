use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::catalog::categories::{GetCategory, ListCategories};
use crate::bootstrap::app_context::AppContext;
use crate::domain::catalog::category::Category;
use crate::presentation::http::error::ApiResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub category_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        CategoryResponse {
            id: c.id,
            name: c.name,
            description: c.description,
            category_type: c.category_type,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/categories", tag = "Categories", security(()),
    responses((status = 200, body = [CategoryResponse])))]
pub async fn list_categories(
    State(ctx): State<AppContext>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let repo = ctx.category_repo();
    let uc = ListCategories {
        repo: repo.as_ref(),
    };
    let items = uc.execute().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")), security(()),
    responses((status = 200, body = CategoryResponse), (status = 404, body = super::error::ErrorBody)))]
pub async fn get_category(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CategoryResponse>> {
    let repo = ctx.category_repo();
    let uc = GetCategory {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}
