use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::role_repository::{NewRole, RoleRepository};
use crate::domain::users::user::RoleWithPermissions;

pub struct CreateRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> CreateRole<'a, R> {
    pub async fn execute(&self, new_role: &NewRole) -> ServiceResult<RoleWithPermissions> {
        if self.repo.find_by_name(&new_role.name).await?.is_some() {
            return Err(ServiceError::conflict(format!(
                "Role with name '{}' already exists",
                new_role.name
            )));
        }
        let role = self.repo.create_role(new_role).await?;
        tracing::info!(role = %role.role.name, permissions = role.permissions.len(), "role_created");
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::MemoryStore;

    #[tokio::test]
    async fn rejects_duplicate_names() {
        let store = MemoryStore::default();
        let perm = store.seed_permission("products.read");
        let uc = CreateRole { repo: &store };
        let new_role = NewRole {
            name: "editor".into(),
            description: None,
            is_active: true,
            permission_ids: vec![perm, uuid::Uuid::new_v4()],
        };
        let created = uc.execute(&new_role).await.unwrap();
        assert_eq!(created.permissions.len(), 1);

        let err = uc.execute(&new_role).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(m) if m.contains("'editor'")));
    }
}
