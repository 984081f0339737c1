pub mod category_repository_sqlx;
pub mod customer_repository_sqlx;
pub mod inventory_repository_sqlx;
pub mod permission_repository_sqlx;
pub mod product_repository_sqlx;
pub mod role_repository_sqlx;
pub mod user_repository_sqlx;
