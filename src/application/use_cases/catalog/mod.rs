pub mod categories;
pub mod create_product;
pub mod list_products;
pub mod update_product;
