use uuid::Uuid;

use super::get_roles::role_not_found;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::role_repository::{RoleChanges, RoleRepository};
use crate::domain::users::user::RoleWithPermissions;

pub struct UpdateRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> UpdateRole<'a, R> {
    pub async fn execute(
        &self,
        id: Uuid,
        changes: &RoleChanges,
    ) -> ServiceResult<RoleWithPermissions> {
        let current = self
            .repo
            .find_active(id)
            .await?
            .ok_or_else(|| role_not_found(id))?;
        if let Some(name) = changes.name.as_deref() {
            if name != current.role.name && self.repo.find_by_name(name).await?.is_some() {
                return Err(ServiceError::conflict(format!(
                    "Role with name '{name}' already exists"
                )));
            }
        }
        self.repo
            .update_role(id, changes)
            .await?
            .ok_or_else(|| role_not_found(id))
    }
}
