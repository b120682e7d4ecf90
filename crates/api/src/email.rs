//! Transactional email delivery
//!
//! Sends account emails via the Resend API. Delivery is fallible and callers
//! decide what a failure means: signup treats it as a reportable outcome of
//! its own, verification treats it as best-effort.

use crate::config::Config;

const RESEND_API_BASE: &str = "https://api.resend.com";

/// Mail gateway configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Base URL of the Resend API (overridable for tests)
    pub api_base: String,
    /// Resend API key
    pub api_key: String,
    /// From address for emails
    pub email_from: String,
    /// Inbox that receives contact-form messages
    pub contact_inbox: String,
    /// App name for branding
    pub app_name: String,
}

impl MailerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_base: RESEND_API_BASE.to_string(),
            api_key: config.resend_api_key.clone(),
            email_from: config.email_from.clone(),
            contact_inbox: config.contact_inbox.clone(),
            app_name: "Cradle".to_string(),
        }
    }
}

/// Transactional email service
#[derive(Clone)]
pub struct Mailer {
    config: MailerConfig,
    client: reqwest::Client,
}

impl Mailer {
    /// Create a new mailer
    pub fn new(config: MailerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Send an email via the Resend API
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailError> {
        let body = serde_json::json!({
            "from": self.config.email_from,
            "to": [to],
            "subject": subject,
            "html": html
        });

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %detail, "Mail gateway rejected email");
            return Err(EmailError::Gateway(status.as_u16()));
        }

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }

    /// Send the welcome email carrying the plaintext verification code
    ///
    /// The code travels out-of-band only; it is never returned in an API
    /// response.
    pub async fn send_verification_code(
        &self,
        to: &str,
        name: &str,
        code: &str,
    ) -> Result<(), EmailError> {
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #059669;">Welcome to {app_name}, {name}!</h2>
    <p>Thanks for signing up. Enter this code to verify your email address:</p>
    <div style="background-color: #ecfdf5; border-left: 4px solid #059669; padding: 16px; margin: 20px 0;">
        <p style="margin: 0; font-size: 28px; letter-spacing: 6px; font-weight: bold;">{code}</p>
    </div>
    <p style="color: #666; font-size: 14px;">
        If you didn't create an account, you can safely ignore this email.
    </p>
    <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">
    <p style="color: #999; font-size: 12px;">{app_name}</p>
</body>
</html>"#,
            app_name = self.config.app_name,
            name = name,
            code = code,
        );

        self.send_email(
            to,
            &format!("Verify your email - {}", self.config.app_name),
            &html,
        )
        .await
    }

    /// Send the post-verification confirmation email
    pub async fn send_verified_confirmation(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #059669;">You're all set, {name}!</h2>
    <p>Your email has been verified and your {app_name} account is active.</p>
    <p>You can now track schedules, expenses and milestones for your little ones, and browse the daily reads.</p>
    <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">
    <p style="color: #999; font-size: 12px;">{app_name}</p>
</body>
</html>"#,
            app_name = self.config.app_name,
            name = name,
        );

        self.send_email(
            to,
            &format!("Email verified - {}", self.config.app_name),
            &html,
        )
        .await
    }

    /// Relay a contact-form message to the support inbox
    pub async fn send_contact_message(
        &self,
        sender_name: &str,
        sender_email: &str,
        message: &str,
    ) -> Result<(), EmailError> {
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>New contact message</h2>
    <p><strong>From:</strong> {sender_name} &lt;{sender_email}&gt;</p>
    <div style="background-color: #f9fafb; border-left: 4px solid #6366f1; padding: 16px; margin: 20px 0;">
        <p style="margin: 0; white-space: pre-wrap;">{message}</p>
    </div>
</body>
</html>"#,
            sender_name = sender_name,
            sender_email = sender_email,
            message = message,
        );

        let inbox = self.config.contact_inbox.clone();
        self.send_email(
            &inbox,
            &format!("Contact form - {}", self.config.app_name),
            &html,
        )
        .await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Mail transport failed: {0}")]
    Transport(String),
    #[error("Mail gateway returned status {0}")]
    Gateway(u16),
}
