//! Sends notification emails over SMTP without blocking request handling.

use std::sync::Arc;

#[cfg(test)]
use std::sync::Mutex;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::MailConfig;

/// A plain text email ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    /// The recipient's email address.
    pub to: String,
    /// The subject line.
    pub subject: String,
    /// The plain text body.
    pub body: String,
}

/// Errors from setting up or using the SMTP transport.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The SMTP relay could not be set up or rejected the message.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// An address could not be parsed.
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be built.
    #[error("could not build email: {0}")]
    Message(#[from] lettre::error::Error),
}

/// An SMTP relay connection and the address mail is sent from.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.sender.clone())
            .to(message.to.parse::<Mailbox>()?)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)?;

        self.transport.send(email).await?;

        Ok(())
    }
}

/// Delivers notification emails.
#[derive(Clone)]
pub enum Mailer {
    /// Send mail through an SMTP relay.
    Smtp(Arc<SmtpMailer>),
    /// Write mail to the log instead of sending it.
    Log,
    /// Keep mail in memory so tests can read it.
    #[cfg(test)]
    Outbox(Arc<Mutex<Vec<EmailMessage>>>),
}

impl Mailer {
    /// Create a mailer that sends through the SMTP relay in `config` using STARTTLS.
    ///
    /// # Errors
    /// Returns a [MailError] if the relay host or sender address is invalid.
    pub fn smtp(config: &MailConfig) -> Result<Self, MailError> {
        let sender = config.sender.parse::<Mailbox>()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Mailer::Smtp(Arc::new(SmtpMailer { transport, sender })))
    }

    /// Create a mailer from optional SMTP settings, logging emails when there are none.
    ///
    /// # Errors
    /// Returns a [MailError] if the SMTP settings are invalid.
    pub fn from_config(config: Option<&MailConfig>) -> Result<Self, MailError> {
        match config {
            Some(config) => Mailer::smtp(config),
            None => Ok(Mailer::Log),
        }
    }

    /// Send `message` without waiting for delivery.
    ///
    /// SMTP delivery happens on a spawned task and failures are only logged.
    pub fn send_in_background(&self, message: EmailMessage) {
        match self {
            Mailer::Smtp(mailer) => {
                let mailer = Arc::clone(mailer);

                tokio::spawn(async move {
                    let to = message.to.clone();

                    match mailer.send(message).await {
                        Ok(()) => tracing::debug!("sent email to {to}"),
                        Err(error) => tracing::error!("could not send email to {to}: {error}"),
                    }
                });
            }
            Mailer::Log => {
                tracing::info!(
                    "email to {}\nsubject: {}\n{}",
                    message.to,
                    message.subject,
                    message.body
                );
            }
            #[cfg(test)]
            Mailer::Outbox(outbox) => match outbox.lock() {
                Ok(mut outbox) => outbox.push(message),
                Err(error) => tracing::error!("could not lock outbox: {error}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::config::MailConfig;

    use super::{EmailMessage, Mailer};

    fn message() -> EmailMessage {
        EmailMessage {
            to: "john@example.com".to_owned(),
            subject: "Hello".to_owned(),
            body: "Hi John".to_owned(),
        }
    }

    #[test]
    fn outbox_collects_messages() {
        let outbox = Arc::new(Mutex::new(Vec::new()));
        let mailer = Mailer::Outbox(outbox.clone());

        mailer.send_in_background(message());

        assert_eq!(*outbox.lock().unwrap(), vec![message()]);
    }

    #[test]
    fn log_mailer_does_not_fail() {
        Mailer::Log.send_in_background(message());
    }

    #[test]
    fn no_config_gives_log_mailer() {
        let mailer = Mailer::from_config(None).unwrap();

        assert!(matches!(mailer, Mailer::Log));
    }

    #[test]
    fn bad_sender_is_rejected() {
        let config = MailConfig {
            host: "smtp.example.com".to_owned(),
            port: 587,
            username: "mailer".to_owned(),
            password: "secret".to_owned(),
            sender: "not an address".to_owned(),
        };

        assert!(Mailer::smtp(&config).is_err());
    }
}
