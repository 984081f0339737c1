use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::product_repository::{
    ProductFilter, ProductRepository, ProductSearch,
};
use crate::domain::catalog::product::Product;

pub(super) fn product_not_found(id: Uuid) -> ServiceError {
    ServiceError::not_found(format!("Product with ID {id} not found"))
}

pub struct ListProducts<'a, R: ProductRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProductRepository + ?Sized> ListProducts<'a, R> {
    pub async fn execute(
        &self,
        category_id: Option<Uuid>,
        is_active: Option<bool>,
    ) -> ServiceResult<Vec<Product>> {
        let filter = ProductFilter {
            category_id,
            is_active: is_active.unwrap_or(true),
        };
        Ok(self.repo.list(&filter).await?)
    }
}

pub struct SearchProducts<'a, R: ProductRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProductRepository + ?Sized> SearchProducts<'a, R> {
    /// `category_ids` is the raw comma-separated list from the query string.
    pub async fn execute(
        &self,
        query: Option<&str>,
        category_ids: Option<&str>,
    ) -> ServiceResult<Vec<Product>> {
        let search = ProductSearch {
            query: query
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            category_ids: parse_id_list(category_ids.unwrap_or_default())?,
        };
        Ok(self.repo.search(&search).await?)
    }
}

fn parse_id_list(raw: &str) -> ServiceResult<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| ServiceError::bad_request(format!("Invalid category id: {s}")))
        })
        .collect()
}

pub struct CountProducts<'a, R: ProductRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProductRepository + ?Sized> CountProducts<'a, R> {
    pub async fn execute(&self) -> ServiceResult<i64> {
        Ok(self.repo.count_active().await?)
    }
}

pub struct GetProduct<'a, R: ProductRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ProductRepository + ?Sized> GetProduct<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<Product> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }
}
