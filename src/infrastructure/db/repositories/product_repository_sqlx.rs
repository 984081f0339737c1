use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::product_repository::{
    NewProduct, ProductChanges, ProductFilter, ProductRepository, ProductSearch,
};
use crate::domain::catalog::product::Product;
use crate::domain::inventory::stock::{DEFAULT_MAXIMUM_STOCK, DEFAULT_MINIMUM_STOCK};
use crate::infrastructure::db::PgPool;

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.category_id, p.vintage_year, \
     p.alcohol_content, p.grape_variety, p.region, p.volume, p.price, p.image_url, p.images, \
     p.tasting_notes, p.food_pairing, p.awards, p.is_active, p.created_at, p.updated_at, \
     p.deleted_at";

fn product_from_row(r: &PgRow) -> Product {
    Product {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        category_id: r.get("category_id"),
        vintage_year: r.get("vintage_year"),
        alcohol_content: r.get("alcohol_content"),
        grape_variety: r.get("grape_variety"),
        region: r.get("region"),
        volume: r.get("volume"),
        price: r.get("price"),
        image_url: r.get("image_url"),
        images: r.get("images"),
        tasting_notes: r.get("tasting_notes"),
        food_pairing: r.get("food_pairing"),
        awards: r.get("awards"),
        is_active: r.get("is_active"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        deleted_at: r.get("deleted_at"),
    }
}

pub struct SqlxProductRepository {
    pub pool: PgPool,
}

impl SqlxProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn create_with_inventory(
        &self,
        new_product: &NewProduct,
        updated_by: &str,
    ) -> anyhow::Result<Product> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            r#"INSERT INTO products AS p (
                   name, description, category_id, vintage_year, alcohol_content,
                   grape_variety, region, volume, price, image_url, images,
                   tasting_notes, food_pairing, awards, is_active
               ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
               RETURNING {PRODUCT_COLUMNS}"#
        ))
        .bind(&new_product.name)
        .bind(&new_product.description)
        .bind(new_product.category_id)
        .bind(new_product.vintage_year)
        .bind(new_product.alcohol_content)
        .bind(&new_product.grape_variety)
        .bind(&new_product.region)
        .bind(new_product.volume)
        .bind(new_product.price)
        .bind(&new_product.image_url)
        .bind(&new_product.images)
        .bind(&new_product.tasting_notes)
        .bind(&new_product.food_pairing)
        .bind(&new_product.awards)
        .bind(new_product.is_active)
        .fetch_one(&mut *tx)
        .await?;
        let product = product_from_row(&row);
        sqlx::query(
            r#"INSERT INTO inventory
                   (product_id, current_stock, reserved_stock, minimum_stock, maximum_stock, updated_by)
               VALUES ($1, 0, 0, $2, $3, $4)"#,
        )
        .bind(product.id)
        .bind(DEFAULT_MINIMUM_STOCK)
        .bind(DEFAULT_MAXIMUM_STOCK)
        .bind(updated_by)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn list(&self, filter: &ProductFilter) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {PRODUCT_COLUMNS} FROM products p
               WHERE p.deleted_at IS NULL
                 AND p.is_active = $1
                 AND ($2::uuid IS NULL OR p.category_id = $2)
               ORDER BY p.created_at DESC"#
        ))
        .bind(filter.is_active)
        .bind(filter.category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(product_from_row).collect())
    }

    async fn search(&self, search: &ProductSearch) -> anyhow::Result<Vec<Product>> {
        let like = search.query.as_ref().map(|q| format!("%{}%", q));
        let rows = sqlx::query(&format!(
            r#"SELECT {PRODUCT_COLUMNS} FROM products p
               WHERE p.deleted_at IS NULL AND p.is_active
                 AND ($1::text IS NULL
                      OR p.name ILIKE $1
                      OR p.description ILIKE $1
                      OR p.grape_variety ILIKE $1
                      OR p.region ILIKE $1)
                 AND (cardinality($2::uuid[]) = 0 OR p.category_id = ANY($2))
               ORDER BY p.created_at DESC"#
        ))
        .bind(&like)
        .bind(&search.category_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(product_from_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1 AND p.deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(product_from_row))
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: &ProductChanges,
    ) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"UPDATE products AS p SET
                   name = COALESCE($2, p.name),
                   description = COALESCE($3, p.description),
                   category_id = COALESCE($4, p.category_id),
                   vintage_year = COALESCE($5, p.vintage_year),
                   alcohol_content = COALESCE($6, p.alcohol_content),
                   grape_variety = COALESCE($7, p.grape_variety),
                   region = COALESCE($8, p.region),
                   volume = COALESCE($9, p.volume),
                   price = COALESCE($10, p.price),
                   image_url = COALESCE($11, p.image_url),
                   images = COALESCE($12, p.images),
                   tasting_notes = COALESCE($13, p.tasting_notes),
                   food_pairing = COALESCE($14, p.food_pairing),
                   awards = COALESCE($15, p.awards),
                   is_active = COALESCE($16, p.is_active),
                   updated_at = now()
               WHERE p.id = $1 AND p.deleted_at IS NULL
               RETURNING {PRODUCT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.category_id)
        .bind(changes.vintage_year)
        .bind(changes.alcohol_content)
        .bind(&changes.grape_variety)
        .bind(&changes.region)
        .bind(changes.volume)
        .bind(changes.price)
        .bind(&changes.image_url)
        .bind(&changes.images)
        .bind(&changes.tasting_notes)
        .bind(&changes.food_pairing)
        .bind(&changes.awards)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(product_from_row))
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE products SET deleted_at = now(), updated_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_active(&self) -> anyhow::Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM products WHERE is_active AND deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("n"))
    }
}
