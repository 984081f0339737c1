use async_trait::async_trait;

use crate::application::ports::mailer::Mailer;

/// Writes outgoing links to the log instead of delivering mail.
pub struct LogMailer {
    app_url: String,
}

impl LogMailer {
    pub fn new(app_url: &str) -> Self {
        Self {
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/auth/verify-email?token={}", self.app_url, token)
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.app_url, token)
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(&self, email: &str, token: &str) -> anyhow::Result<()> {
        let link = self.verification_link(token);
        tracing::info!(to = %email, %link, "verification_email");
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str, token: &str) -> anyhow::Result<()> {
        let link = self.reset_link(token);
        tracing::info!(to = %email, %link, "password_reset_email");
        Ok(())
    }
}
