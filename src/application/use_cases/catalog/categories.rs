use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::category_repository::CategoryRepository;
use crate::domain::catalog::category::Category;

pub struct ListCategories<'a, R: CategoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CategoryRepository + ?Sized> ListCategories<'a, R> {
    pub async fn execute(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.repo.list().await?)
    }
}

pub struct GetCategory<'a, R: CategoryRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CategoryRepository + ?Sized> GetCategory<'a, R> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Category with ID {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fakes::MemoryCatalog;

    #[tokio::test]
    async fn missing_category_names_the_id() {
        let catalog = MemoryCatalog::default();
        let id = Uuid::new_v4();
        let err = GetCategory { repo: &catalog }.execute(id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(m) if m == format!("Category with ID {id} not found")));
    }

    #[tokio::test]
    async fn lists_sorted_by_name() {
        let catalog = MemoryCatalog::default();
        catalog.seed_category("Tinto");
        catalog.seed_category("Blanco");
        let names: Vec<_> = ListCategories { repo: &catalog }
            .execute()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Blanco", "Tinto"]);
    }
}
