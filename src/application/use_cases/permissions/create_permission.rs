use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::permission_repository::{NewPermission, PermissionRepository};
use crate::domain::users::user::Permission;

pub struct CreatePermission<'a, R: PermissionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PermissionRepository + ?Sized> CreatePermission<'a, R> {
    pub async fn execute(&self, new_permission: &NewPermission) -> ServiceResult<Permission> {
        if self
            .repo
            .find_by_name(&new_permission.name)
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict(format!(
                "Permission with name '{}' already exists",
                new_permission.name
            )));
        }
        Ok(self.repo.create_permission(new_permission).await?)
    }
}
