//! services/storefront/src/adapters/mailer.rs
//!
//! An adapter that implements the `MailService` port by writing each message
//! to the log instead of delivering it, for development setups without SMTP.

use async_trait::async_trait;
use storefront_core::ports::{MailService, OutgoingMail, PortResult};
use tracing::info;

#[derive(Clone, Debug)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    /// Creates a new `LogMailer` sending as `from`.
    pub fn new(from: String) -> Self {
        Self { from }
    }
}

#[async_trait]
impl MailService for LogMailer {
    async fn send_mail(&self, mail: OutgoingMail) -> PortResult<()> {
        info!(
            from = %self.from,
            to = %mail.to,
            subject = %mail.subject,
            "Outgoing mail:\n{}",
            mail.body
        );
        Ok(())
    }
}
