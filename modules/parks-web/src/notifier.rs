//! Outbound email. `SmtpMailer` talks to a relay via lettre; with no SMTP
//! host configured it logs the message and sends nothing.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{info, warn};

use parks_common::{ParksError, SmtpConfig};

/// A plain-text message to one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, ParksError> {
        let transport = if config.host.trim().is_empty() {
            warn!("SMTP host not configured; mailer will operate in no-op mode");
            None
        } else {
            let builder = if config.starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            }
            .map_err(|e| ParksError::Config(format!("Failed to configure SMTP transport: {e}")))?
            .port(config.port);

            let builder = if let (Some(username), Some(password)) =
                (&config.username, &config.password)
            {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let Some(transport) = &self.transport else {
            info!(
                subject = %mail.subject,
                recipients = mail.to.len(),
                "Mailer running in no-op mode; skipping actual send"
            );
            return Ok(());
        };

        if mail.to.is_empty() {
            warn!(subject = %mail.subject, "No recipients; mail not sent");
            return Ok(());
        }

        let from: Mailbox = mail
            .from
            .parse()
            .with_context(|| format!("Invalid sender address {}", mail.from))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(mail.subject.as_str())
            .header(header::ContentType::TEXT_PLAIN);
        for recipient in &mail.to {
            let to: Mailbox = recipient
                .parse()
                .with_context(|| format!("Invalid recipient address {recipient}"))?;
            builder = builder.to(to);
        }

        let message = builder
            .body(mail.body.clone())
            .context("Failed to build email message")?;

        transport
            .send(message)
            .await
            .context("Failed to send email")?;

        info!(subject = %mail.subject, recipients = mail.to.len(), "Email sent");
        Ok(())
    }
}
