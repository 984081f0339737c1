use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{RoleWithPermissions, User};

fn user_not_found(id: Uuid) -> ServiceError {
    ServiceError::not_found(format!("User with ID {id} not found"))
}

/// Replaces the user's roles with the active roles among `role_ids`.
pub struct AssignRoles<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub users: &'a U,
    pub roles: &'a R,
}

impl<'a, U, R> AssignRoles<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        role_ids: &[Uuid],
    ) -> ServiceResult<Vec<RoleWithPermissions>> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(user_not_found(user_id));
        }
        let valid = self.roles.find_active_by_ids(role_ids).await?;
        if valid.is_empty() {
            return Err(ServiceError::not_found("No valid roles found"));
        }
        let ids: Vec<Uuid> = valid.iter().map(|r| r.id).collect();
        self.users.replace_roles(user_id, &ids).await?;
        tracing::info!(%user_id, roles = ids.len(), "user_roles_assigned");
        Ok(self.users.roles_of(user_id).await?)
    }
}

pub struct RemoveRoles<'a, U: UserRepository + ?Sized> {
    pub users: &'a U,
}

impl<'a, U: UserRepository + ?Sized> RemoveRoles<'a, U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        role_ids: &[Uuid],
    ) -> ServiceResult<Vec<RoleWithPermissions>> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(user_not_found(user_id));
        }
        self.users.remove_roles(user_id, role_ids).await?;
        Ok(self.users.roles_of(user_id).await?)
    }
}

pub struct UsersByRole<'a, U: UserRepository + ?Sized> {
    pub users: &'a U,
}

impl<'a, U: UserRepository + ?Sized> UsersByRole<'a, U> {
    pub async fn execute(&self, role_name: &str) -> ServiceResult<Vec<User>> {
        Ok(self.users.find_by_role(role_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::MemoryStore;

    #[tokio::test]
    async fn assigns_only_active_roles() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);
        let editor = store.seed_role("editor", &["products.update"]);
        let retired = store.seed_role("retired", &[]);
        store.deactivate(retired).await.unwrap();

        let roles = AssignRoles {
            users: &store,
            roles: &store,
        }
        .execute(user.id, &[editor, retired])
        .await
        .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role.name, "editor");

        let by_role = UsersByRole { users: &store }.execute("editor").await.unwrap();
        assert_eq!(by_role.len(), 1);

        let left = RemoveRoles { users: &store }
            .execute(user.id, &[editor])
            .await
            .unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn no_valid_roles_is_not_found() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);
        let err = AssignRoles {
            users: &store,
            roles: &store,
        }
        .execute(user.id, &[Uuid::new_v4()])
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(m) if m == "No valid roles found"));
    }
}
