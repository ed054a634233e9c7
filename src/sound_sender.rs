use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::{
    alert::{AlertKind, AlertSender},
    config::{Config, SoundSettings},
    error::{WatchError, WatchResult},
};

/// Plays an audio file per alert kind through an external player.
pub struct SoundSender {
    settings: SoundSettings,
}

impl SoundSender {
    pub fn new(settings: SoundSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> WatchResult<Box<dyn AlertSender>> {
        let settings = config.senders.sound.clone().ok_or_else(|| {
            WatchError::Config("sender `sound` needs an [alert.sound] section".to_string())
        })?;
        Ok(Box::new(Self::new(settings)))
    }

    fn audio_file(&self, kind: AlertKind) -> &str {
        match kind {
            AlertKind::LoginRequired => &self.settings.login_required_file,
            AlertKind::ScheduleFound => &self.settings.schedule_found_file,
        }
    }
}

#[async_trait]
impl AlertSender for SoundSender {
    fn id(&self) -> &str {
        "sound"
    }

    async fn alert(&self, kind: AlertKind, _message: Option<&str>) -> anyhow::Result<()> {
        let file = self.audio_file(kind);
        debug!("Playing: {file}");
        let status = Command::new(&self.settings.player)
            .arg(file)
            .status()
            .await?;
        anyhow::ensure!(
            status.success(),
            "`{} {file}` exited with {status}",
            self.settings.player
        );
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sender(player: &str) -> SoundSender {
        SoundSender::new(SoundSettings {
            player: player.to_string(),
            login_required_file: "login.mp3".to_string(),
            schedule_found_file: "found.mp3".to_string(),
        })
    }

    #[test]
    fn picks_the_file_for_each_kind() {
        let sender = sender("true");
        assert_eq!(sender.audio_file(AlertKind::LoginRequired), "login.mp3");
        assert_eq!(sender.audio_file(AlertKind::ScheduleFound), "found.mp3");
    }

    #[tokio::test]
    async fn successful_player_is_ok() {
        sender("true")
            .alert(AlertKind::ScheduleFound, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failing_player_is_an_error() {
        let err = sender("false")
            .alert(AlertKind::LoginRequired, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("`false login.mp3` exited"));
    }

    #[tokio::test]
    async fn missing_player_is_an_error() {
        assert!(
            sender("/no/such/player")
                .alert(AlertKind::LoginRequired, None)
                .await
                .is_err()
        );
    }
}
