use uuid::Uuid;

use super::stock_levels::inventory_not_found;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::inventory_repository::{
    InventoryChange, InventoryRepository, NewStockMovement,
};
use crate::domain::inventory::stock::StockMovement;

pub struct RecordMovement<'a, R: InventoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: InventoryRepository + ?Sized> RecordMovement<'a, R> {
    pub async fn execute(
        &self,
        product_id: Uuid,
        movement: &NewStockMovement,
        actor: &str,
    ) -> ServiceResult<InventoryChange> {
        if movement.quantity < 1 {
            return Err(ServiceError::Validation(vec![
                "quantity must be at least 1".to_string(),
            ]));
        }
        let change = self
            .repo
            .record_movement(product_id, movement, actor)
            .await?
            .ok_or_else(|| inventory_not_found(product_id))?;
        tracing::info!(
            %product_id,
            kind = %movement.kind,
            quantity = movement.quantity,
            new_stock = change.inventory.current_stock,
            "stock_movement_recorded"
        );
        Ok(change)
    }
}

pub struct ListMovements<'a, R: InventoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: InventoryRepository + ?Sized> ListMovements<'a, R> {
    pub async fn execute(&self, product_id: Uuid) -> ServiceResult<Vec<StockMovement>> {
        Ok(self.repo.movements(product_id).await?)
    }
}
