use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::user::Permission;

#[derive(Debug, Clone)]
pub struct NewPermission {
    pub name: String,
    pub description: Option<String>,
    pub module: String,
    pub action: String,
}

#[derive(Debug, Clone, Default)]
pub struct PermissionChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub module: Option<String>,
    pub action: Option<String>,
}

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn create_permission(&self, new_permission: &NewPermission)
    -> anyhow::Result<Permission>;
    /// Ordered by name; optionally restricted to one module.
    async fn list(&self, module: Option<&str>) -> anyhow::Result<Vec<Permission>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Permission>>;
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Permission>>;
    async fn update_permission(
        &self,
        id: Uuid,
        changes: &PermissionChanges,
    ) -> anyhow::Result<Option<Permission>>;
    async fn delete_permission(&self, id: Uuid) -> anyhow::Result<bool>;
}
