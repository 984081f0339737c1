use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::domain::users::user::RoleWithPermissions;

pub(super) fn role_not_found(id: Uuid) -> ServiceError {
    ServiceError::not_found(format!("Role with ID {id} not found"))
}

pub struct ListRoles<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> ListRoles<'a, R> {
    pub async fn execute(&self) -> ServiceResult<Vec<RoleWithPermissions>> {
        Ok(self.repo.list_active().await?)
    }
}

pub struct GetRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> GetRole<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<RoleWithPermissions> {
        self.repo
            .find_active(id)
            .await?
            .ok_or_else(|| role_not_found(id))
    }
}
