use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::catalog::product::Product;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub vintage_year: i32,
    pub alcohol_content: Option<Decimal>,
    pub grape_variety: Option<String>,
    pub region: Option<String>,
    pub volume: Option<i32>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub tasting_notes: Option<String>,
    pub food_pairing: Vec<String>,
    pub awards: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub vintage_year: Option<i32>,
    pub alcohol_content: Option<Decimal>,
    pub grape_variety: Option<String>,
    pub region: Option<String>,
    pub volume: Option<i32>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub tasting_notes: Option<String>,
    pub food_pairing: Option<Vec<String>>,
    pub awards: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductSearch {
    pub query: Option<String>,
    pub category_ids: Vec<Uuid>,
}

/// Soft-deleted products are never returned.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts the product together with its empty inventory row in one transaction.
    async fn create_with_inventory(
        &self,
        new_product: &NewProduct,
        updated_by: &str,
    ) -> anyhow::Result<Product>;
    async fn list(&self, filter: &ProductFilter) -> anyhow::Result<Vec<Product>>;
    async fn search(&self, search: &ProductSearch) -> anyhow::Result<Vec<Product>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>>;
    async fn update_product(
        &self,
        id: Uuid,
        changes: &ProductChanges,
    ) -> anyhow::Result<Option<Product>>;
    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn count_active(&self) -> anyhow::Result<i64>;
}
