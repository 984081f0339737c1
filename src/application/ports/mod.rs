pub mod category_repository;
pub mod customer_repository;
pub mod inventory_repository;
pub mod mailer;
pub mod password_hasher;
pub mod permission_repository;
pub mod product_repository;
pub mod role_repository;
pub mod token_blacklist;
pub mod token_service;
pub mod user_repository;
