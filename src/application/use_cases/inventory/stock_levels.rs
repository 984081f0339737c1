use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::inventory_repository::{
    InventoryChange, InventoryLevels, InventoryRepository,
};
use crate::domain::inventory::stock::Inventory;

pub(super) fn inventory_not_found(product_id: Uuid) -> ServiceError {
    ServiceError::not_found(format!("Inventory for product {product_id} not found"))
}

pub struct GetInventory<'a, R: InventoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: InventoryRepository + ?Sized> GetInventory<'a, R> {
    pub async fn execute(&self, product_id: Uuid) -> ServiceResult<Inventory> {
        self.repo
            .find_by_product(product_id)
            .await?
            .ok_or_else(|| inventory_not_found(product_id))
    }
}

pub struct UpdateInventory<'a, R: InventoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: InventoryRepository + ?Sized> UpdateInventory<'a, R> {
    pub async fn execute(
        &self,
        product_id: Uuid,
        levels: &InventoryLevels,
        actor: &str,
    ) -> ServiceResult<InventoryChange> {
        let negative = [
            ("current_stock", levels.current_stock),
            ("minimum_stock", levels.minimum_stock),
            ("maximum_stock", levels.maximum_stock),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_some_and(|v| v < 0))
        .map(|(field, _)| format!("{field} must not be negative"))
        .collect::<Vec<_>>();
        if !negative.is_empty() {
            return Err(ServiceError::Validation(negative));
        }
        let change = self
            .repo
            .update_levels(product_id, levels, actor)
            .await?
            .ok_or_else(|| inventory_not_found(product_id))?;
        tracing::info!(
            %product_id,
            actor,
            current_stock = change.inventory.current_stock,
            adjusted = change.movement.is_some(),
            "inventory_updated"
        );
        Ok(change)
    }
}

pub struct LowStock<'a, R: InventoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: InventoryRepository + ?Sized> LowStock<'a, R> {
    pub async fn execute(&self) -> ServiceResult<Vec<Inventory>> {
        Ok(self.repo.low_stock().await?)
    }
}

pub struct OutOfStock<'a, R: InventoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: InventoryRepository + ?Sized> OutOfStock<'a, R> {
    pub async fn execute(&self) -> ServiceResult<Vec<Inventory>> {
        Ok(self.repo.out_of_stock().await?)
    }
}
