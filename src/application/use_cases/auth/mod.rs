pub mod authenticate;
pub mod change_password;
pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod profile;
pub mod register_customer;
pub mod reset_password;
pub mod verify_email;
