use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::role_repository_sqlx::{ROLE_COLUMNS, role_from_row, with_permissions};
use crate::application::ports::user_repository::{
    NewUser, UserChanges, UserFilter, UserPage, UserRepository,
};
use crate::domain::users::user::{RoleWithPermissions, User};
use crate::infrastructure::db::PgPool;

const USER_COLUMNS: &str = "u.id, u.email, u.name, u.password_hash, u.is_email_verified, \
     u.email_verification_token, u.password_reset_token, u.password_reset_expires, \
     u.avatar, u.created_at, u.updated_at, u.deleted_at";

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        email: r.get("email"),
        name: r.get("name"),
        password_hash: r.get("password_hash"),
        is_email_verified: r.get("is_email_verified"),
        email_verification_token: r.get("email_verification_token"),
        password_reset_token: r.get("password_reset_token"),
        password_reset_expires: r.get("password_reset_expires"),
        avatar: r.get("avatar"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        deleted_at: r.get("deleted_at"),
    }
}

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(&self, new_user: &NewUser) -> anyhow::Result<User> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO users AS u (email, name, password_hash, is_email_verified)
               VALUES ($1, $2, $3, $4)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.is_email_verified)
        .fetch_one(&self.pool)
        .await?;
        Ok(user_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1 AND u.deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1 AND u.deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn list(&self, filter: &UserFilter) -> anyhow::Result<UserPage> {
        let email_like = filter.email.as_ref().map(|e| format!("%{}%", e));
        let name_like = filter.name.as_ref().map(|n| format!("%{}%", n));
        let conditions = r#"u.deleted_at IS NULL
               AND ($1::text IS NULL OR u.email ILIKE $1)
               AND ($2::text IS NULL OR u.name ILIKE $2)
               AND ($3::boolean IS NULL OR u.is_email_verified = $3)"#;

        let total: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) AS n FROM users u WHERE {conditions}"
        ))
        .bind(&email_like)
        .bind(&name_like)
        .bind(filter.is_email_verified)
        .fetch_one(&self.pool)
        .await?
        .get("n");

        let rows = sqlx::query(&format!(
            r#"SELECT {USER_COLUMNS} FROM users u WHERE {conditions}
               ORDER BY u.created_at DESC
               LIMIT $4 OFFSET $5"#
        ))
        .bind(&email_like)
        .bind(&name_like)
        .bind(filter.is_email_verified)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(UserPage {
            users: rows.iter().map(user_from_row).collect(),
            total,
        })
    }

    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"UPDATE users AS u SET
                   name = COALESCE($2, u.name),
                   email = COALESCE($3, u.email),
                   password_hash = COALESCE($4, u.password_hash),
                   avatar = COALESCE($5, u.avatar),
                   is_email_verified = COALESCE($6, u.is_email_verified),
                   updated_at = now()
               WHERE u.id = $1 AND u.deleted_at IS NULL
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.avatar)
        .bind(changes.is_email_verified)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE users SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn restore(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE users SET deleted_at = NULL, updated_at = now() WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn roles_of(&self, user_id: Uuid) -> anyhow::Result<Vec<RoleWithPermissions>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {ROLE_COLUMNS} FROM roles r
               JOIN user_roles ur ON ur.role_id = r.id
               WHERE ur.user_id = $1 AND r.is_active
               ORDER BY r.name"#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        with_permissions(&self.pool, rows.iter().map(role_from_row).collect()).await
    }

    async fn replace_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"INSERT INTO user_roles (user_id, role_id)
               SELECT $1, r.id FROM roles r WHERE r.id = ANY($2)"#,
        )
        .bind(user_id)
        .bind(role_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = ANY($2)")
            .bind(user_id)
            .bind(role_ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_role(&self, role_name: &str) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {USER_COLUMNS} FROM users u
               JOIN user_roles ur ON ur.user_id = u.id
               JOIN roles r ON r.id = ur.role_id
               WHERE r.name = $1 AND u.deleted_at IS NULL
               ORDER BY u.created_at DESC"#
        ))
        .bind(role_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn set_email_verification_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET email_verification_token = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_email_verified(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE users SET is_email_verified = true, email_verification_token = NULL,
                   updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_password_reset(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE users SET password_reset_token = $2, password_reset_expires = $3,
                   updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE users SET password_hash = $2, password_reset_token = NULL,
                   password_reset_expires = NULL, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
