//! Notification dispatch over email.
//!
//! Uses `lettre` for SMTP transport. Dispatch is best-effort: callers log
//! failures and never let them affect the operation that produced the event.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;

/// Template sent when a plan change is approved.
pub const PLAN_APPROVED_TEMPLATE: &str = "plan_approved";
/// Template sent when a plan change is rejected.
pub const PLAN_REJECTED_TEMPLATE: &str = "plan_rejected";

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    /// No template registered under this name.
    #[error("Unknown email template: {0}")]
    UnknownTemplate(String),
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Recipient address.
    pub recipient_email: String,
    /// Subject line.
    pub subject: String,
    /// Template name.
    pub template_name: String,
    /// Values substituted into the template.
    pub template_data: Value,
}

impl Notification {
    /// Creates a new notification.
    #[must_use]
    pub fn new(
        recipient_email: impl Into<String>,
        subject: impl Into<String>,
        template_name: impl Into<String>,
        template_data: Value,
    ) -> Self {
        Self {
            recipient_email: recipient_email.into(),
            subject: subject.into(),
            template_name: template_name.into(),
            template_data,
        }
    }
}

/// Sink for user-facing notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a notification.
    async fn dispatch(&self, notification: Notification) -> Result<(), EmailError>;
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| EmailError::SendError(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build(),
        )
    }

    /// Renders the body of a named template.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::UnknownTemplate` for unregistered template names.
    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, EmailError> {
        let field = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let organization = field("organizationName");
        let plan = field("planName");
        let dashboard_url = format!("{}/dashboard", self.config.frontend_url);

        match template_name {
            PLAN_APPROVED_TEMPLATE => Ok(format!(
                r"Hi {organization},

Your request to move to the {plan} plan has been approved.
Your new modules are available now: {dashboard_url}

Best regards,
The {from} Team",
                from = self.config.from_name
            )),
            PLAN_REJECTED_TEMPLATE => {
                let reason = field("reason");
                let reason_line = if reason.is_empty() {
                    String::new()
                } else {
                    format!("Reason: {reason}\n")
                };
                Ok(format!(
                    r"Hi {organization},

Your request to change plans has not been approved.
{reason_line}Your current plan remains active. Reply to this email if you have questions.

Best regards,
The {from} Team",
                    from = self.config.from_name
                ))
            }
            other => Err(EmailError::UnknownTemplate(other.to_string())),
        }
    }

    /// Sends a plain-text email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn dispatch(&self, notification: Notification) -> Result<(), EmailError> {
        let body = self.render(&notification.template_name, &notification.template_data)?;
        self.send_email(&notification.recipient_email, &notification.subject, &body)
            .await
    }
}

/// Notifier that only logs, used when SMTP is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn dispatch(&self, notification: Notification) -> Result<(), EmailError> {
        info!(
            recipient = %notification.recipient_email,
            template = %notification.template_name,
            subject = %notification.subject,
            "Notification dispatched (email disabled)"
        );
        Ok(())
    }
}
