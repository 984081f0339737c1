use uuid::Uuid;

use super::get_permissions::permission_not_found;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::permission_repository::{PermissionChanges, PermissionRepository};
use crate::domain::users::user::Permission;

pub struct UpdatePermission<'a, R: PermissionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PermissionRepository + ?Sized> UpdatePermission<'a, R> {
    pub async fn execute(&self, id: Uuid, changes: &PermissionChanges) -> ServiceResult<Permission> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| permission_not_found(id))?;
        if let Some(name) = changes.name.as_deref() {
            if name != current.name && self.repo.find_by_name(name).await?.is_some() {
                return Err(ServiceError::conflict(format!(
                    "Permission with name '{name}' already exists"
                )));
            }
        }
        self.repo
            .update_permission(id, changes)
            .await?
            .ok_or_else(|| permission_not_found(id))
    }
}
