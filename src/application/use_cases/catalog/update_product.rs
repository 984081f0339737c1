use uuid::Uuid;

use super::create_product::check_product_rules;
use super::list_products::product_not_found;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::category_repository::CategoryRepository;
use crate::application::ports::product_repository::{ProductChanges, ProductRepository};
use crate::domain::catalog::product::Product;

pub struct UpdateProduct<'a, P, C>
where
    P: ProductRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    pub products: &'a P,
    pub categories: &'a C,
}

impl<'a, P, C> UpdateProduct<'a, P, C>
where
    P: ProductRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid, changes: &ProductChanges) -> ServiceResult<Product> {
        check_product_rules(
            changes.vintage_year,
            changes.alcohol_content,
            changes.price,
            changes.volume,
        )?;
        if self.products.find_by_id(id).await?.is_none() {
            return Err(product_not_found(id));
        }
        if let Some(category_id) = changes.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(ServiceError::not_found("Category not found"));
            }
        }
        self.products
            .update_product(id, changes)
            .await?
            .ok_or_else(|| product_not_found(id))
    }
}

pub struct DeleteProduct<'a, R: ProductRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProductRepository + ?Sized> DeleteProduct<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<()> {
        if !self.repo.soft_delete(id).await? {
            return Err(product_not_found(id));
        }
        tracing::info!(product_id = %id, "product_deleted");
        Ok(())
    }
}

pub struct ToggleProductStatus<'a, R: ProductRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProductRepository + ?Sized> ToggleProductStatus<'a, R> {
    pub async fn execute(&self, id: Uuid, is_active: bool) -> ServiceResult<Product> {
        let changes = ProductChanges {
            is_active: Some(is_active),
            ..Default::default()
        };
        self.repo
            .update_product(id, &changes)
            .await?
            .ok_or_else(|| product_not_found(id))
    }
}
