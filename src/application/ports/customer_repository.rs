use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::customers::customer::{CommunicationPreferences, CustomerAccount, WineType};

#[derive(Debug, Clone)]
pub struct NewCustomerAccount {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub customer_code: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub communication: CommunicationPreferences,
    pub wine_types: Vec<WineType>,
    /// Role assigned to the new user when it exists and is active.
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created {
        user_id: Uuid,
        customer_id: Uuid,
        role_assigned: bool,
    },
    EmailTaken,
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Creates the user, customer, profile and preference rows as one unit of
    /// work. Nothing is persisted unless every step succeeds.
    async fn register(&self, account: &NewCustomerAccount) -> anyhow::Result<RegistrationOutcome>;
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<CustomerAccount>>;
    async fn update_preferences(
        &self,
        user_id: Uuid,
        communication: CommunicationPreferences,
        wine_types: &[WineType],
    ) -> anyhow::Result<Option<CustomerAccount>>;
}
