pub mod jwt;
pub mod password;
pub mod token_blacklist;
