//! Email dispatch over SMTP.

use anyhow::{Context, Result};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Credentials;

/// Subject line of the digest email.
pub const DIGEST_SUBJECT: &str = "YouTube Emacs Search";

/// Sends the rendered digest through the configured SMTP account.
pub struct EmailSender {
    smtp_host: String,
    smtp_port: u16,
    smtp_username: String,
    smtp_password: String,
}

impl EmailSender {
    /// Create a sender from the loaded credentials.
    #[must_use]
    pub fn new(creds: &Credentials) -> Self {
        Self {
            smtp_host: creds.smtp_host.clone(),
            smtp_port: creds.smtp_port,
            smtp_username: creds.smtp_username.clone(),
            smtp_password: creds.smtp_password.clone(),
        }
    }

    /// Send the HTML digest to the account's own address.
    pub async fn send(&self, subject: &str, html_body: String) -> Result<()> {
        let from: Mailbox = self
            .smtp_username
            .parse()
            .context("SMTP username is not a valid email address")?;
        let to = from.clone();

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .context("failed to build email message")?;

        let creds = SmtpCredentials::new(self.smtp_username.clone(), self.smtp_password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp_host)
                .context("failed to create SMTP transport")?
                .port(self.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .context("failed to send email via SMTP")?;

        tracing::info!(
            to = %self.smtp_username,
            subject,
            "Digest email sent"
        );

        Ok(())
    }
}
