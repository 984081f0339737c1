pub mod create_role;
pub mod delete_role;
pub mod get_roles;
pub mod role_permissions;
pub mod update_role;
