pub mod create_permission;
pub mod delete_permission;
pub mod get_permissions;
pub mod update_permission;
