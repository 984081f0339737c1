use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::permission_repository::PermissionRepository;
use crate::domain::users::user::Permission;

pub(super) fn permission_not_found(id: Uuid) -> ServiceError {
    ServiceError::not_found(format!("Permission with ID {id} not found"))
}

pub struct ListPermissions<'a, R: PermissionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PermissionRepository + ?Sized> ListPermissions<'a, R> {
    pub async fn execute(&self, module: Option<&str>) -> ServiceResult<Vec<Permission>> {
        let module = module.map(str::trim).filter(|m| !m.is_empty());
        Ok(self.repo.list(module).await?)
    }
}

pub struct GetPermission<'a, R: PermissionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PermissionRepository + ?Sized> GetPermission<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<Permission> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| permission_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::MemoryStore;

    #[tokio::test]
    async fn filters_by_module_and_sorts() {
        let store = MemoryStore::default();
        store.seed_permission("users.read");
        store.seed_permission("products.update");
        store.seed_permission("products.create");
        let uc = ListPermissions { repo: &store };

        let all: Vec<_> = uc
            .execute(None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(all, vec!["products.create", "products.update", "users.read"]);

        let products = uc.execute(Some("products")).await.unwrap();
        assert_eq!(products.len(), 2);
    }
}
