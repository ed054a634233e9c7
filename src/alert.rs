use std::fmt;

use async_trait::async_trait;
use log::{debug, error, info};

use crate::{error::SenderError, log_context::LogContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    LoginRequired,
    ScheduleFound,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LoginRequired => "login_required",
            AlertKind::ScheduleFound => "schedule_found",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub message: Option<String>,
}

impl AlertEvent {
    pub fn login_required() -> Self {
        Self {
            kind: AlertKind::LoginRequired,
            message: Some("Please, login into the system!".to_string()),
        }
    }

    pub fn schedule_found(subject: &str, availability: &str) -> Self {
        Self {
            kind: AlertKind::ScheduleFound,
            message: Some(format!("ATTENTION: There is a spot for {subject} on {availability}")),
        }
    }
}

/// A channel that gets a human's attention.
#[async_trait]
pub trait AlertSender: Send + Sync {
    /// The identifier the sender was registered under.
    fn id(&self) -> &str;

    async fn alert(&self, kind: AlertKind, message: Option<&str>) -> anyhow::Result<()>;
}

/// Fans every event out to the registered senders, one after the other.
pub struct AlertDispatcher {
    senders: Vec<Box<dyn AlertSender>>,
}

impl AlertDispatcher {
    pub fn new(senders: Vec<Box<dyn AlertSender>>) -> Self {
        Self { senders }
    }

    pub fn sender_ids(&self) -> Vec<&str> {
        self.senders.iter().map(|sender| sender.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Delivers `event` to every sender in registration order and returns how
    /// many of them succeeded. A failing sender is logged and skipped.
    pub async fn dispatch(&self, event: &AlertEvent, ctx: LogContext) -> usize {
        if let Some(message) = &event.message {
            info!("[{ctx}] {message}");
        }
        debug!(
            "[{ctx}] Calling {} alert sender(s) for {}",
            self.senders.len(),
            event.kind
        );

        let mut delivered = 0;
        for sender in &self.senders {
            match sender.alert(event.kind, event.message.as_deref()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    let err = SenderError {
                        sender: sender.id().to_string(),
                        reason: format!("{e:#}"),
                    };
                    error!("[{ctx}] {err}");
                }
            }
        }
        delivered
    }
}
