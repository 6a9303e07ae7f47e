//! Notification transports: SMTP via lettre, and a logging dry run.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::info;

use super::message::Reminder;
use crate::config::SmtpConfig;
use crate::error::NotifyError;

/// Port on which the relay expects STARTTLS rather than implicit TLS.
const SUBMISSION_PORT: u16 = 587;

/// Delivers a composed reminder to its recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, reminder: &Reminder) -> Result<(), NotifyError>;
}

/// Sends reminders through an authenticated SMTP relay.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from_address)?;

        let relay = if config.port == SUBMISSION_PORT {
            SmtpTransport::starttls_relay(&config.host)
        } else {
            SmtpTransport::relay(&config.host)
        };
        let builder = relay.map_err(|e| NotifyError::Transport {
            reason: format!("SMTP relay error: {e}"),
            transient: false,
        })?;

        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );
        let transport = builder.port(config.port).credentials(creds).build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, reminder: &Reminder) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&reminder.recipient)?)
            .subject(reminder.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(reminder.body.clone())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|e| NotifyError::InvalidAddress {
        address: address.to_string(),
        reason: format!("{e}"),
    })
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        let message = self.build_message(reminder)?;
        let transport = self.transport.clone();

        // lettre's SmtpTransport blocks on the network.
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| NotifyError::Transport {
                reason: format!("send task panicked: {e}"),
                transient: false,
            })?
            .map_err(|e| NotifyError::Transport {
                transient: e.is_transient() || e.is_timeout(),
                reason: format!("SMTP send failed: {e}"),
            })?;

        info!(recipient = %reminder.recipient, "Reminder email sent");
        Ok(())
    }
}

/// Logs reminders instead of sending them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        info!(
            recipient = %reminder.recipient,
            subject = %reminder.subject,
            "Dry run: reminder not sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(port: u16) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.test.com".into(),
            port,
            username: "bot@test.com".into(),
            password: SecretString::from("pass"),
            from_address: "Task Tracker <bot@test.com>".into(),
        }
    }

    fn reminder(to: &str) -> Reminder {
        Reminder {
            recipient: to.into(),
            subject: "[REMINDER] Task due soon: Report".into(),
            body: "Hello".into(),
        }
    }

    fn notifier(port: u16) -> SmtpNotifier {
        let _ = rustls::crypto::ring::default_provider().install_default();
        SmtpNotifier::new(&config(port)).unwrap()
    }

    #[test]
    fn builds_for_starttls_and_implicit_tls_ports() {
        assert_eq!(notifier(587).name(), "smtp");
        assert_eq!(notifier(465).name(), "smtp");
    }

    #[test]
    fn rejects_invalid_from_address() {
        let mut cfg = config(587);
        cfg.from_address = "not an address".into();
        assert!(matches!(
            SmtpNotifier::new(&cfg),
            Err(NotifyError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn message_for_valid_recipient() {
        let message = notifier(587).build_message(&reminder("lananh@acme.io")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: lananh@acme.io"));
        assert!(raw.contains("Subject: [REMINDER] Task due soon: Report"));
    }

    #[test]
    fn message_rejects_empty_local_part() {
        let err = notifier(587).build_message(&reminder("@acme.io")).unwrap_err();
        assert!(matches!(err, NotifyError::InvalidAddress { ref address, .. } if address == "@acme.io"));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier.send(&reminder("x@acme.io")).await.is_ok());
    }
}
