use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{RoleWithPermissions, User};

pub struct GetUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct UserDetail {
    pub user: User,
    pub roles: Vec<RoleWithPermissions>,
}

impl<'a, R: UserRepository + ?Sized> GetUser<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<UserDetail> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("User with ID {id} not found")))?;
        let roles = self.repo.roles_of(id).await?;
        Ok(UserDetail { user, roles })
    }
}
