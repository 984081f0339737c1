use chrono::Utc;
use rust_decimal::Decimal;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::category_repository::CategoryRepository;
use crate::application::ports::product_repository::{NewProduct, ProductRepository};
use crate::domain::catalog::product::{
    MAX_PRICE, MIN_VINTAGE_YEAR, Product, is_valid_alcohol_content, is_valid_price, is_valid_vintage,
    max_vintage_year,
};

/// Range checks shared by create and update. `None` means the field is not
/// being written.
pub(super) fn check_product_rules(
    vintage_year: Option<i32>,
    alcohol_content: Option<Decimal>,
    price: Option<Decimal>,
    volume: Option<i32>,
) -> ServiceResult<()> {
    let now = Utc::now();
    let mut problems = Vec::new();
    if let Some(year) = vintage_year {
        if !is_valid_vintage(year, now) {
            problems.push(format!(
                "vintage_year must be between {MIN_VINTAGE_YEAR} and {}",
                max_vintage_year(now)
            ));
        }
    }
    if alcohol_content.is_some_and(|v| !is_valid_alcohol_content(v)) {
        problems.push("alcohol_content must be between 0 and 100".to_string());
    }
    if price.is_some_and(|v| !is_valid_price(v)) {
        problems.push(format!("price must be between 0 and {MAX_PRICE}"));
    }
    if volume.is_some_and(|v| v <= 0) {
        problems.push("volume must be a positive number".to_string());
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(problems))
    }
}

pub struct CreateProduct<'a, P, C>
where
    P: ProductRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    pub products: &'a P,
    pub categories: &'a C,
}

impl<'a, P, C> CreateProduct<'a, P, C>
where
    P: ProductRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    /// `actor` ends up in the new inventory row's `updated_by`.
    pub async fn execute(&self, new_product: &NewProduct, actor: &str) -> ServiceResult<Product> {
        check_product_rules(
            Some(new_product.vintage_year),
            new_product.alcohol_content,
            Some(new_product.price),
            new_product.volume,
        )?;
        if self
            .categories
            .find_by_id(new_product.category_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Category not found"));
        }
        let product = self
            .products
            .create_with_inventory(new_product, actor)
            .await?;
        tracing::info!(product_id = %product.id, actor, "product_created");
        Ok(product)
    }
}

#[cfg(test)]
pub(crate) fn sample_product(category_id: uuid::Uuid) -> NewProduct {
    NewProduct {
        name: "Gran Reserva".into(),
        description: Some("Crianza en barrica".into()),
        category_id,
        vintage_year: 2018,
        alcohol_content: Some(Decimal::new(1350, 2)),
        grape_variety: Some("Tempranillo".into()),
        region: Some("Rioja".into()),
        volume: Some(750),
        price: Decimal::new(2990, 2),
        image_url: None,
        images: vec![],
        tasting_notes: None,
        food_pairing: vec!["cordero".into()],
        awards: vec![],
        is_active: true,
    }
}
