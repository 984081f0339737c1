use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;

pub struct DeleteUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> DeleteUser<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<()> {
        if !self.repo.soft_delete(id).await? {
            return Err(ServiceError::not_found(format!("User with ID {id} not found")));
        }
        tracing::info!(user_id = %id, "user_soft_deleted");
        Ok(())
    }
}

pub struct RestoreUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> RestoreUser<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<()> {
        if !self.repo.restore(id).await? {
            return Err(ServiceError::not_found(format!(
                "User with ID {id} not found or already restored"
            )));
        }
        tracing::info!(user_id = %id, "user_restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::MemoryStore;

    #[tokio::test]
    async fn delete_hides_and_restore_brings_back() {
        let store = MemoryStore::default();
        let user = store.seed_user("ana@example.com", "x", true);

        DeleteUser { repo: &store }.execute(user.id).await.unwrap();
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(matches!(
            DeleteUser { repo: &store }.execute(user.id).await,
            Err(ServiceError::NotFound(_))
        ));

        RestoreUser { repo: &store }.execute(user.id).await.unwrap();
        assert!(store.find_by_id(user.id).await.unwrap().is_some());
        assert!(matches!(
            RestoreUser { repo: &store }.execute(user.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
