pub mod catalog;
pub mod customers;
pub mod inventory;
pub mod users;
