use async_trait::async_trait;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::application::ports::customer_repository::{
    CustomerRepository, NewCustomerAccount, RegistrationOutcome,
};
use crate::domain::customers::customer::{
    CommunicationPreferences, Customer, CustomerAccount, CustomerProfile, WineType,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxCustomerRepository {
    pub pool: PgPool,
}

impl SqlxCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_wine_types(
        tx: &mut Transaction<'_, Postgres>,
        customer_id: Uuid,
        wine_types: &[WineType],
    ) -> anyhow::Result<()> {
        for wine_type in wine_types {
            sqlx::query(
                r#"INSERT INTO customer_wine_preferences (customer_id, wine_type)
                   VALUES ($1, $2) ON CONFLICT (customer_id, wine_type) DO NOTHING"#,
            )
            .bind(customer_id)
            .bind(wine_type.as_str())
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for SqlxCustomerRepository {
    async fn register(&self, account: &NewCustomerAccount) -> anyhow::Result<RegistrationOutcome> {
        let mut tx = self.pool.begin().await?;

        let taken = sqlx::query("SELECT 1 FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(&account.email)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if taken {
            return Ok(RegistrationOutcome::EmailTaken);
        }

        let user_id: Uuid = sqlx::query(
            r#"INSERT INTO users (email, name, password_hash, is_email_verified)
               VALUES ($1, $2, $3, false)
               RETURNING id"#,
        )
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.password_hash)
        .fetch_one(&mut *tx)
        .await?
        .get("id");

        let customer_id: Uuid = sqlx::query(
            "INSERT INTO customers (user_id, customer_code) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(&account.customer_code)
        .fetch_one(&mut *tx)
        .await?
        .get("id");

        if account.phone.is_some() || account.birth_date.is_some() {
            sqlx::query(
                "INSERT INTO customer_profiles (customer_id, phone, birth_date) VALUES ($1, $2, $3)",
            )
            .bind(customer_id)
            .bind(&account.phone)
            .bind(account.birth_date)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"INSERT INTO customer_communication_preferences
                   (customer_id, receive_notifications, receive_newsletter)
               VALUES ($1, $2, $3)"#,
        )
        .bind(customer_id)
        .bind(account.communication.receive_notifications)
        .bind(account.communication.receive_newsletter)
        .execute(&mut *tx)
        .await?;

        Self::insert_wine_types(&mut tx, customer_id, &account.wine_types).await?;

        let role_assigned = sqlx::query(
            r#"INSERT INTO user_roles (user_id, role_id)
               SELECT $1, r.id FROM roles r WHERE r.name = $2 AND r.is_active"#,
        )
        .bind(user_id)
        .bind(&account.role_name)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        tx.commit().await?;
        Ok(RegistrationOutcome::Created {
            user_id,
            customer_id,
            role_assigned,
        })
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<CustomerAccount>> {
        let row = sqlx::query(
            r#"SELECT c.id, c.user_id, c.customer_code, c.created_at,
                      pr.id AS profile_id, pr.phone, pr.birth_date,
                      cp.receive_notifications, cp.receive_newsletter
               FROM customers c
               JOIN users u ON u.id = c.user_id AND u.deleted_at IS NULL
               LEFT JOIN customer_profiles pr ON pr.customer_id = c.id
               LEFT JOIN customer_communication_preferences cp ON cp.customer_id = c.id
               WHERE c.user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let customer = Customer {
            id: row.get("id"),
            user_id: row.get("user_id"),
            customer_code: row.get("customer_code"),
            created_at: row.get("created_at"),
        };
        let profile_id: Option<Uuid> = row.get("profile_id");
        let profile = profile_id.map(|_| CustomerProfile {
            phone: row.get("phone"),
            birth_date: row.get("birth_date"),
        });
        let defaults = CommunicationPreferences::default();
        let communication = CommunicationPreferences {
            receive_notifications: row
                .get::<Option<bool>, _>("receive_notifications")
                .unwrap_or(defaults.receive_notifications),
            receive_newsletter: row
                .get::<Option<bool>, _>("receive_newsletter")
                .unwrap_or(defaults.receive_newsletter),
        };

        let type_rows = sqlx::query(
            "SELECT wine_type FROM customer_wine_preferences WHERE customer_id = $1 ORDER BY created_at, wine_type",
        )
        .bind(customer.id)
        .fetch_all(&self.pool)
        .await?;
        let wine_types = type_rows
            .iter()
            .map(|r| {
                r.get::<String, _>("wine_type")
                    .parse::<WineType>()
                    .map_err(anyhow::Error::msg)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Some(CustomerAccount {
            customer,
            profile,
            communication,
            wine_types,
        }))
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        communication: CommunicationPreferences,
        wine_types: &[WineType],
    ) -> anyhow::Result<Option<CustomerAccount>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT id FROM customers WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let customer_id: Uuid = row.get("id");

        sqlx::query(
            r#"INSERT INTO customer_communication_preferences
                   (customer_id, receive_notifications, receive_newsletter)
               VALUES ($1, $2, $3)
               ON CONFLICT (customer_id) DO UPDATE SET
                   receive_notifications = EXCLUDED.receive_notifications,
                   receive_newsletter = EXCLUDED.receive_newsletter,
                   updated_at = now()"#,
        )
        .bind(customer_id)
        .bind(communication.receive_notifications)
        .bind(communication.receive_newsletter)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM customer_wine_preferences WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;
        Self::insert_wine_types(&mut tx, customer_id, wine_types).await?;
        tx.commit().await?;

        self.find_by_user(user_id).await
    }
}
