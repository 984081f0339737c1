use async_trait::async_trait;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(&self, email: &str, token: &str) -> anyhow::Result<()>;
    async fn send_password_reset_email(&self, email: &str, token: &str) -> anyhow::Result<()>;
}
