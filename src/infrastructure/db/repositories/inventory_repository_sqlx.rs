use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::application::ports::inventory_repository::{
    InventoryChange, InventoryLevels, InventoryRepository, NewStockMovement,
};
use crate::domain::inventory::stock::{Inventory, StockMovement, StockMovementKind};
use crate::infrastructure::db::PgPool;

const INVENTORY_COLUMNS: &str = "i.id, i.product_id, i.current_stock, i.reserved_stock, \
     i.minimum_stock, i.maximum_stock, i.last_updated, i.updated_by";

const MOVEMENT_COLUMNS: &str = "id, product_id, type, quantity, previous_stock, new_stock, \
     reason, reference_id, created_at, created_by";

fn inventory_from_row(r: &PgRow) -> Inventory {
    Inventory {
        id: r.get("id"),
        product_id: r.get("product_id"),
        current_stock: r.get("current_stock"),
        reserved_stock: r.get("reserved_stock"),
        minimum_stock: r.get("minimum_stock"),
        maximum_stock: r.get("maximum_stock"),
        last_updated: r.get("last_updated"),
        updated_by: r.get("updated_by"),
    }
}

fn movement_from_row(r: &PgRow) -> anyhow::Result<StockMovement> {
    let kind: String = r.get("type");
    Ok(StockMovement {
        id: r.get("id"),
        product_id: r.get("product_id"),
        kind: kind.parse::<StockMovementKind>()?,
        quantity: r.get("quantity"),
        previous_stock: r.get("previous_stock"),
        new_stock: r.get("new_stock"),
        reason: r.get("reason"),
        reference_id: r.get("reference_id"),
        created_at: r.get("created_at"),
        created_by: r.get("created_by"),
    })
}

pub struct SqlxInventoryRepository {
    pub pool: PgPool,
}

impl SqlxInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_row(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> anyhow::Result<Option<Inventory>> {
        let row = sqlx::query(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory i WHERE i.product_id = $1 FOR UPDATE"
        ))
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.as_ref().map(inventory_from_row))
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_movement(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        kind: StockMovementKind,
        quantity: i32,
        previous_stock: i32,
        new_stock: i32,
        reason: Option<&str>,
        reference_id: Option<Uuid>,
        actor: &str,
    ) -> anyhow::Result<StockMovement> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO stock_movements
                   (product_id, type, quantity, previous_stock, new_stock, reason, reference_id, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {MOVEMENT_COLUMNS}"#
        ))
        .bind(product_id)
        .bind(kind.as_str())
        .bind(quantity)
        .bind(previous_stock)
        .bind(new_stock)
        .bind(reason)
        .bind(reference_id)
        .bind(actor)
        .fetch_one(&mut **tx)
        .await?;
        movement_from_row(&row)
    }

    async fn listed_with(&self, condition: &str) -> anyhow::Result<Vec<Inventory>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {INVENTORY_COLUMNS} FROM inventory i
               JOIN products p ON p.id = i.product_id
               WHERE p.is_active AND p.deleted_at IS NULL AND {condition}
               ORDER BY i.current_stock ASC"#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(inventory_from_row).collect())
    }
}

#[async_trait]
impl InventoryRepository for SqlxInventoryRepository {
    async fn find_by_product(&self, product_id: Uuid) -> anyhow::Result<Option<Inventory>> {
        let row = sqlx::query(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory i WHERE i.product_id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(inventory_from_row))
    }

    async fn update_levels(
        &self,
        product_id: Uuid,
        levels: &InventoryLevels,
        actor: &str,
    ) -> anyhow::Result<Option<InventoryChange>> {
        let mut tx = self.pool.begin().await?;
        let Some(current) = Self::lock_row(&mut tx, product_id).await? else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            r#"UPDATE inventory AS i SET
                   current_stock = COALESCE($2, i.current_stock),
                   minimum_stock = COALESCE($3, i.minimum_stock),
                   maximum_stock = COALESCE($4, i.maximum_stock),
                   last_updated = now(),
                   updated_by = $5
               WHERE i.product_id = $1
               RETURNING {INVENTORY_COLUMNS}"#
        ))
        .bind(product_id)
        .bind(levels.current_stock)
        .bind(levels.minimum_stock)
        .bind(levels.maximum_stock)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        let inventory = inventory_from_row(&row);

        let movement = if inventory.current_stock != current.current_stock {
            let reason = format!("Stock adjustment by {actor}");
            Some(
                Self::insert_movement(
                    &mut tx,
                    product_id,
                    StockMovementKind::Adjustment,
                    (inventory.current_stock - current.current_stock).abs(),
                    current.current_stock,
                    inventory.current_stock,
                    Some(&reason),
                    None,
                    actor,
                )
                .await?,
            )
        } else {
            None
        };
        tx.commit().await?;
        Ok(Some(InventoryChange {
            inventory,
            movement,
        }))
    }

    async fn record_movement(
        &self,
        product_id: Uuid,
        movement: &NewStockMovement,
        actor: &str,
    ) -> anyhow::Result<Option<InventoryChange>> {
        let mut tx = self.pool.begin().await?;
        let Some(current) = Self::lock_row(&mut tx, product_id).await? else {
            return Ok(None);
        };
        let new_stock = movement
            .kind
            .apply(current.current_stock, movement.quantity);
        let row = sqlx::query(&format!(
            r#"UPDATE inventory AS i SET current_stock = $2, last_updated = now(), updated_by = $3
               WHERE i.product_id = $1
               RETURNING {INVENTORY_COLUMNS}"#
        ))
        .bind(product_id)
        .bind(new_stock)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        let inventory = inventory_from_row(&row);
        let recorded = Self::insert_movement(
            &mut tx,
            product_id,
            movement.kind,
            movement.quantity,
            current.current_stock,
            new_stock,
            movement.reason.as_deref(),
            movement.reference_id,
            actor,
        )
        .await?;
        tx.commit().await?;
        Ok(Some(InventoryChange {
            inventory,
            movement: Some(recorded),
        }))
    }

    async fn movements(&self, product_id: Uuid) -> anyhow::Result<Vec<StockMovement>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {MOVEMENT_COLUMNS} FROM stock_movements
               WHERE product_id = $1
               ORDER BY created_at DESC"#
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(movement_from_row).collect()
    }

    async fn low_stock(&self) -> anyhow::Result<Vec<Inventory>> {
        self.listed_with("i.current_stock > 0 AND i.current_stock <= i.minimum_stock")
            .await
    }

    async fn out_of_stock(&self) -> anyhow::Result<Vec<Inventory>> {
        self.listed_with("i.current_stock = 0").await
    }
}
