pub mod auth;
pub mod catalog;
pub mod customers;
pub mod inventory;
pub mod permissions;
pub mod roles;
pub mod users;

#[cfg(test)]
pub(crate) mod fakes;
