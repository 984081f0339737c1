use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::customer_repository::CustomerRepository;
use crate::domain::customers::customer::{
    CommunicationPreferences, CustomerAccount, WineType, dedup_wine_types,
};

fn no_customer_record() -> ServiceError {
    ServiceError::not_found("Customer record not found")
}

pub struct GetMyAccount<'a, R: CustomerRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CustomerRepository + ?Sized> GetMyAccount<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> ServiceResult<CustomerAccount> {
        self.repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(no_customer_record)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    pub receive_notifications: Option<bool>,
    pub receive_newsletter: Option<bool>,
    /// Replaces the stored set when present.
    pub wine_types: Option<Vec<WineType>>,
}

pub struct UpdateMyPreferences<'a, R: CustomerRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CustomerRepository + ?Sized> UpdateMyPreferences<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        update: &PreferencesUpdate,
    ) -> ServiceResult<CustomerAccount> {
        let current = self
            .repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(no_customer_record)?;
        let communication = CommunicationPreferences {
            receive_notifications: update
                .receive_notifications
                .unwrap_or(current.communication.receive_notifications),
            receive_newsletter: update
                .receive_newsletter
                .unwrap_or(current.communication.receive_newsletter),
        };
        let wine_types = match &update.wine_types {
            Some(types) => dedup_wine_types(types),
            None => current.wine_types,
        };
        self.repo
            .update_preferences(user_id, communication, &wine_types)
            .await?
            .ok_or_else(no_customer_record)
    }
}
