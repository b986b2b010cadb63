use async_trait::async_trait;

use super::{MailError, Mailer};

/// Development mailer that writes messages to the log instead of
/// delivering them.
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, subject = %subject, body = %body, "outgoing email");
        Ok(())
    }
}
