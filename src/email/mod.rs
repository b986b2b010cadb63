//! Outgoing mail for verification codes, reset links and application
//! outcomes.
//!
//! Delivery is fire-and-forget: callers log a failed send but never fail
//! the surrounding request over it. The [`Mailer`] trait keeps the
//! transport injectable so tests can capture messages instead of
//! delivering them.

mod console;
mod smtp;

pub use console::ConsoleMailer;
pub use smtp::SmtpMailer;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;

/// Mail sending error.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Invalid mail configuration: {0}")]
    InvalidConfig(String),
}

/// Transport-agnostic mail sender.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a plain-text message. No delivery confirmation is reported
    /// beyond transport-level errors.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Build the mailer selected by `EMAIL_BACKEND`.
pub fn create_mailer(config: &Config) -> Result<Arc<dyn Mailer>, MailError> {
    match config.email_backend.as_str() {
        "smtp" => {
            let host = config.smtp_host.clone().ok_or_else(|| {
                MailError::InvalidConfig("SMTP_HOST is required for the smtp backend".to_string())
            })?;
            let mailer = SmtpMailer::new(
                host,
                config.smtp_port,
                config.smtp_username.clone(),
                config.smtp_password.clone(),
                config.email_from.clone(),
            )?;
            Ok(Arc::new(mailer))
        }
        "console" => Ok(Arc::new(ConsoleMailer)),
        other => Err(MailError::InvalidConfig(format!(
            "Unknown email backend: {}",
            other
        ))),
    }
}

/// Send without surfacing errors to the caller — the send outcome is only
/// logged. Registration and reset flows deliberately succeed even when
/// delivery fails.
pub async fn send_fire_and_forget(mailer: &dyn Mailer, to: &str, subject: &str, body: &str) {
    if let Err(e) = mailer.send(to, subject, body).await {
        tracing::warn!(to = %to, subject = %subject, error = %e, "email delivery failed");
    }
}
