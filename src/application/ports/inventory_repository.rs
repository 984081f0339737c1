use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::inventory::stock::{Inventory, StockMovement, StockMovementKind};

#[derive(Debug, Clone, Default)]
pub struct InventoryLevels {
    pub current_stock: Option<i32>,
    pub minimum_stock: Option<i32>,
    pub maximum_stock: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub kind: StockMovementKind,
    pub quantity: i32,
    pub reason: Option<String>,
    pub reference_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct InventoryChange {
    pub inventory: Inventory,
    pub movement: Option<StockMovement>,
}

/// Writes run in a single transaction holding a row lock on the inventory
/// record, so the history row and the stock level never disagree.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn find_by_product(&self, product_id: Uuid) -> anyhow::Result<Option<Inventory>>;
    /// Applies new levels. Records an adjustment movement when the on-hand
    /// count changes. Returns `None` when the product has no inventory row.
    async fn update_levels(
        &self,
        product_id: Uuid,
        levels: &InventoryLevels,
        actor: &str,
    ) -> anyhow::Result<Option<InventoryChange>>;
    async fn record_movement(
        &self,
        product_id: Uuid,
        movement: &NewStockMovement,
        actor: &str,
    ) -> anyhow::Result<Option<InventoryChange>>;
    /// Newest first.
    async fn movements(&self, product_id: Uuid) -> anyhow::Result<Vec<StockMovement>>;
    async fn low_stock(&self) -> anyhow::Result<Vec<Inventory>>;
    async fn out_of_stock(&self) -> anyhow::Result<Vec<Inventory>>;
}
