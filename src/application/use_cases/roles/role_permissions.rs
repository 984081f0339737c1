use uuid::Uuid;

use super::get_roles::role_not_found;
use crate::application::error::ServiceResult;
use crate::application::ports::role_repository::RoleRepository;
use crate::domain::users::user::RoleWithPermissions;

/// Adds permissions to a role; ones already granted are left as they are.
pub struct AddRolePermissions<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> AddRolePermissions<'a, R> {
    pub async fn execute(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> ServiceResult<RoleWithPermissions> {
        if self.repo.find_active(role_id).await?.is_none() {
            return Err(role_not_found(role_id));
        }
        self.repo.add_permissions(role_id, permission_ids).await?;
        self.repo
            .find_active(role_id)
            .await?
            .ok_or_else(|| role_not_found(role_id))
    }
}

pub struct RemoveRolePermissions<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> RemoveRolePermissions<'a, R> {
    pub async fn execute(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> ServiceResult<RoleWithPermissions> {
        if self.repo.find_active(role_id).await?.is_none() {
            return Err(role_not_found(role_id));
        }
        self.repo.remove_permissions(role_id, permission_ids).await?;
        self.repo
            .find_active(role_id)
            .await?
            .ok_or_else(|| role_not_found(role_id))
    }
}
