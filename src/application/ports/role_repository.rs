use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::user::{Role, RoleWithPermissions};

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub permission_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    /// Replaces the whole permission set when present.
    pub permission_ids: Option<Vec<Uuid>>,
}

/// Unknown permission ids are ignored by every write that takes them.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create_role(&self, new_role: &NewRole) -> anyhow::Result<RoleWithPermissions>;
    async fn list_active(&self) -> anyhow::Result<Vec<RoleWithPermissions>>;
    async fn find_active(&self, id: Uuid) -> anyhow::Result<Option<RoleWithPermissions>>;
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>>;
    async fn find_active_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Role>>;
    async fn update_role(
        &self,
        id: Uuid,
        changes: &RoleChanges,
    ) -> anyhow::Result<Option<RoleWithPermissions>>;
    async fn deactivate(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn add_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> anyhow::Result<()>;
    async fn remove_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> anyhow::Result<()>;
    async fn count(&self) -> anyhow::Result<i64>;
}
