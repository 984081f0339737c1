use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::permission_repository::{
    NewPermission, PermissionChanges, PermissionRepository,
};
use crate::domain::users::user::Permission;
use crate::infrastructure::db::PgPool;

pub(crate) const PERMISSION_COLUMNS: &str =
    "p.id, p.name, p.description, p.module, p.action, p.created_at, p.updated_at";

pub(crate) fn permission_from_row(r: &PgRow) -> Permission {
    Permission {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        module: r.get("module"),
        action: r.get("action"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

pub struct SqlxPermissionRepository {
    pub pool: PgPool,
}

impl SqlxPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for SqlxPermissionRepository {
    async fn create_permission(
        &self,
        new_permission: &NewPermission,
    ) -> anyhow::Result<Permission> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO permissions AS p (name, description, module, action)
               VALUES ($1, $2, $3, $4)
               RETURNING {PERMISSION_COLUMNS}"#
        ))
        .bind(&new_permission.name)
        .bind(&new_permission.description)
        .bind(&new_permission.module)
        .bind(&new_permission.action)
        .fetch_one(&self.pool)
        .await?;
        Ok(permission_from_row(&row))
    }

    async fn list(&self, module: Option<&str>) -> anyhow::Result<Vec<Permission>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {PERMISSION_COLUMNS} FROM permissions p
               WHERE ($1::text IS NULL OR p.module = $1)
               ORDER BY p.name"#
        ))
        .bind(module)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(permission_from_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Permission>> {
        let row = sqlx::query(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(permission_from_row))
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Permission>> {
        let row = sqlx::query(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions p WHERE p.name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(permission_from_row))
    }

    async fn update_permission(
        &self,
        id: Uuid,
        changes: &PermissionChanges,
    ) -> anyhow::Result<Option<Permission>> {
        let row = sqlx::query(&format!(
            r#"UPDATE permissions AS p SET
                   name = COALESCE($2, p.name),
                   description = COALESCE($3, p.description),
                   module = COALESCE($4, p.module),
                   action = COALESCE($5, p.action),
                   updated_at = now()
               WHERE p.id = $1
               RETURNING {PERMISSION_COLUMNS}"#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.module)
        .bind(&changes.action)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(permission_from_row))
    }

    async fn delete_permission(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
