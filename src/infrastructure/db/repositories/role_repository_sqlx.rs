use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::permission_repository_sqlx::{PERMISSION_COLUMNS, permission_from_row};
use crate::application::ports::role_repository::{NewRole, RoleChanges, RoleRepository};
use crate::domain::users::user::{Permission, Role, RoleWithPermissions};
use crate::infrastructure::db::PgPool;

pub(crate) const ROLE_COLUMNS: &str =
    "r.id, r.name, r.description, r.is_active, r.created_at, r.updated_at";

pub(crate) fn role_from_row(r: &PgRow) -> Role {
    Role {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        is_active: r.get("is_active"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

/// Loads the permissions of every role in one query and pairs them up.
pub(crate) async fn with_permissions(
    pool: &PgPool,
    roles: Vec<Role>,
) -> anyhow::Result<Vec<RoleWithPermissions>> {
    if roles.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();
    let rows = sqlx::query(&format!(
        r#"SELECT rp.role_id, {PERMISSION_COLUMNS}
           FROM role_permissions rp
           JOIN permissions p ON p.id = rp.permission_id
           WHERE rp.role_id = ANY($1)
           ORDER BY p.name"#
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
    for r in rows.iter() {
        by_role
            .entry(r.get("role_id"))
            .or_default()
            .push(permission_from_row(r));
    }
    Ok(roles
        .into_iter()
        .map(|role| RoleWithPermissions {
            permissions: by_role.remove(&role.id).unwrap_or_default(),
            role,
        })
        .collect())
}

pub struct SqlxRoleRepository {
    pub pool: PgPool,
}

impl SqlxRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_active(&self, id: Uuid) -> anyhow::Result<Option<RoleWithPermissions>> {
        let row = sqlx::query(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles r WHERE r.id = $1 AND r.is_active"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(with_permissions(&self.pool, vec![role_from_row(&row)])
            .await?
            .pop())
    }
}

#[async_trait]
impl RoleRepository for SqlxRoleRepository {
    async fn create_role(&self, new_role: &NewRole) -> anyhow::Result<RoleWithPermissions> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            r#"INSERT INTO roles AS r (name, description, is_active)
               VALUES ($1, $2, $3)
               RETURNING {ROLE_COLUMNS}"#
        ))
        .bind(&new_role.name)
        .bind(&new_role.description)
        .bind(new_role.is_active)
        .fetch_one(&mut *tx)
        .await?;
        let role = role_from_row(&row);
        // Unknown permission ids drop out of the join.
        sqlx::query(
            r#"INSERT INTO role_permissions (role_id, permission_id)
               SELECT $1, p.id FROM permissions p WHERE p.id = ANY($2)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(role.id)
        .bind(&new_role.permission_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        with_permissions(&self.pool, vec![role])
            .await?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("created role missing"))
    }

    async fn list_active(&self) -> anyhow::Result<Vec<RoleWithPermissions>> {
        let rows = sqlx::query(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles r WHERE r.is_active ORDER BY r.name"
        ))
        .fetch_all(&self.pool)
        .await?;
        with_permissions(&self.pool, rows.iter().map(role_from_row).collect()).await
    }

    async fn find_active(&self, id: Uuid) -> anyhow::Result<Option<RoleWithPermissions>> {
        self.load_active(id).await
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>> {
        let row = sqlx::query(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles r WHERE r.name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(role_from_row))
    }

    async fn find_active_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Role>> {
        let rows = sqlx::query(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles r WHERE r.id = ANY($1) AND r.is_active"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(role_from_row).collect())
    }

    async fn update_role(
        &self,
        id: Uuid,
        changes: &RoleChanges,
    ) -> anyhow::Result<Option<RoleWithPermissions>> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            r#"UPDATE roles SET
                   name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   is_active = COALESCE($4, is_active),
                   updated_at = now()
               WHERE id = $1 AND is_active"#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.is_active)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        if let Some(permission_ids) = &changes.permission_ids {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                r#"INSERT INTO role_permissions (role_id, permission_id)
                   SELECT $1, p.id FROM permissions p WHERE p.id = ANY($2)"#,
            )
            .bind(id)
            .bind(permission_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        // A role deactivated by this update is still returned to the caller.
        let row = sqlx::query(&format!("SELECT {ROLE_COLUMNS} FROM roles r WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(with_permissions(&self.pool, vec![role_from_row(&row)])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn deactivate(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE roles SET is_active = false, updated_at = now() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn add_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO role_permissions (role_id, permission_id)
               SELECT $1, p.id FROM permissions p WHERE p.id = ANY($2)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = ANY($2)")
            .bind(role_id)
            .bind(permission_ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM roles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
