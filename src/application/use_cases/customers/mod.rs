pub mod my_account;
