use std::io::Write;

use async_trait::async_trait;

use crate::{
    alert::{AlertKind, AlertSender},
    config::Config,
    error::WatchResult,
};

const BELL: char = '\u{7}';

/// Prints the alert on the terminal and rings the bell.
pub struct ConsoleSender;

impl ConsoleSender {
    pub fn from_config(_config: &Config) -> WatchResult<Box<dyn AlertSender>> {
        Ok(Box::new(ConsoleSender))
    }

    fn line(kind: AlertKind, message: Option<&str>) -> String {
        let text = message.unwrap_or(match kind {
            AlertKind::LoginRequired => "Login needed!",
            AlertKind::ScheduleFound => "A spot is available!",
        });
        format!("{BELL}{text}")
    }
}

#[async_trait]
impl AlertSender for ConsoleSender {
    fn id(&self) -> &str {
        "console"
    }

    async fn alert(&self, kind: AlertKind, message: Option<&str>) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", Self::line(kind, message))?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_message_when_present() {
        assert_eq!(
            ConsoleSender::line(AlertKind::ScheduleFound, Some("spot on 12/05/2024")),
            "\u{7}spot on 12/05/2024"
        );
    }

    #[test]
    fn falls_back_to_kind_text() {
        assert_eq!(
            ConsoleSender::line(AlertKind::LoginRequired, None),
            "\u{7}Login needed!"
        );
    }
}
