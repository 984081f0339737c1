use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalog::category::Category;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Category>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Category>>;
    async fn count(&self) -> anyhow::Result<i64>;
    async fn insert(&self, name: &str, description: Option<&str>) -> anyhow::Result<Category>;
}
