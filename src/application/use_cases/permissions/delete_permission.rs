use uuid::Uuid;

use super::get_permissions::permission_not_found;
use crate::application::error::ServiceResult;
use crate::application::ports::permission_repository::PermissionRepository;

/// Hard delete; role grants referencing the permission cascade away.
pub struct DeletePermission<'a, R: PermissionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PermissionRepository + ?Sized> DeletePermission<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<()> {
        if !self.repo.delete_permission(id).await? {
            return Err(permission_not_found(id));
        }
        tracing::info!(permission_id = %id, "permission_deleted");
        Ok(())
    }
}
