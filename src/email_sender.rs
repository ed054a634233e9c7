use async_trait::async_trait;
use chrono::Local;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{
    alert::{AlertKind, AlertSender},
    config::{Config, EmailSettings},
    error::{WatchError, WatchResult},
};

/// Mails every alert through an SMTPS relay.
pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn new(settings: &EmailSettings) -> WatchResult<Self> {
        let from = parse_mailbox("sender", &settings.sender)?;
        let to = parse_mailbox("target", &settings.target)?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .map_err(|e| {
                WatchError::Config(format!("[alert.email] smtp.host `{}`: {e}", settings.smtp_host))
            })?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self { mailer, from, to })
    }

    pub fn from_config(config: &Config) -> WatchResult<Box<dyn AlertSender>> {
        let settings = config.senders.email.as_ref().ok_or_else(|| {
            WatchError::Config("sender `email` needs an [alert.email] section".to_string())
        })?;
        Ok(Box::new(Self::new(settings)?))
    }

    fn build_message(&self, kind: AlertKind, message: Option<&str>) -> anyhow::Result<Message> {
        let subject = match kind {
            AlertKind::LoginRequired => "Login needed on the schedule portal",
            AlertKind::ScheduleFound => "New spot available!",
        };
        let body = format!(
            "{}\n\nSent at {}",
            message.unwrap_or(subject),
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;
        Ok(email)
    }
}

fn parse_mailbox(key: &str, raw: &str) -> WatchResult<Mailbox> {
    raw.parse()
        .map_err(|e| WatchError::Config(format!("[alert.email] {key} `{raw}`: {e}")))
}

#[async_trait]
impl AlertSender for EmailSender {
    fn id(&self) -> &str {
        "email"
    }

    async fn alert(&self, kind: AlertKind, message: Option<&str>) -> anyhow::Result<()> {
        let email = self.build_message(kind, message)?;
        self.mailer.send(email).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(sender: &str) -> EmailSettings {
        EmailSettings {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            sender: sender.to_string(),
            password: "secret".to_string(),
            target: "you@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn bad_address_is_a_config_error() {
        assert!(matches!(
            EmailSender::new(&settings("not an address")),
            Err(WatchError::Config(msg)) if msg.contains("sender")
        ));
    }

    #[tokio::test]
    async fn message_has_subject_per_kind() {
        let sender = EmailSender::new(&settings("me@example.com")).unwrap();

        let email = sender
            .build_message(AlertKind::ScheduleFound, Some("spot on 12/05/2024"))
            .unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();

        assert!(raw.contains("Subject: New spot available!"));
        assert!(raw.contains("To: you@example.com"));
        assert!(raw.contains("spot on 12/05/2024"));
    }
}
