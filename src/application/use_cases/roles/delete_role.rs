use uuid::Uuid;

use super::get_roles::role_not_found;
use crate::application::error::ServiceResult;
use crate::application::ports::role_repository::RoleRepository;

/// Roles are retired by deactivation; assignments stay but no longer grant anything.
pub struct DeleteRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> DeleteRole<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<()> {
        if !self.repo.deactivate(id).await? {
            return Err(role_not_found(id));
        }
        tracing::info!(role_id = %id, "role_deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::ServiceError;
    use crate::application::use_cases::fakes::MemoryStore;

    #[tokio::test]
    async fn deactivated_roles_disappear_from_reads() {
        let store = MemoryStore::default();
        let role = store.seed_role("editor", &[]);
        DeleteRole { repo: &store }.execute(role).await.unwrap();
        assert!(store.find_active(role).await.unwrap().is_none());
        assert!(matches!(
            DeleteRole { repo: &store }.execute(role).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
