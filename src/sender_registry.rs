use log::info;

use crate::{
    alert::{AlertDispatcher, AlertSender},
    config::Config,
    console_sender::ConsoleSender,
    email_sender::EmailSender,
    error::{WatchError, WatchResult},
    sound_sender::SoundSender,
    webhook_sender::WebhookSender,
};

type SenderConstructor = fn(&Config) -> WatchResult<Box<dyn AlertSender>>;

const REGISTRY: &[(&str, SenderConstructor)] = &[
    ("console", ConsoleSender::from_config),
    ("sound", SoundSender::from_config),
    ("webhook", WebhookSender::from_config),
    ("email", EmailSender::from_config),
];

pub fn known_senders() -> Vec<&'static str> {
    REGISTRY.iter().map(|(id, _)| *id).collect()
}

/// Builds the senders named in `[alert]`, keeping their order.
pub fn build_senders(config: &Config) -> WatchResult<Vec<Box<dyn AlertSender>>> {
    info!("Adding alert senders as configured on configuration file");
    config
        .alert_senders
        .iter()
        .map(|id| {
            let (_, constructor) = REGISTRY
                .iter()
                .find(|(known, _)| *known == id.as_str())
                .ok_or_else(|| {
                    WatchError::Config(format!(
                        "unknown alert sender `{id}`, expected one of: {}",
                        known_senders().join(", ")
                    ))
                })?;
            constructor(config)
        })
        .collect()
}

pub fn build_dispatcher(config: &Config) -> WatchResult<AlertDispatcher> {
    Ok(AlertDispatcher::new(build_senders(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(alerts: &str, extra: &str) -> Config {
        let text = format!(
            "[subject]\nsubject.1 = CNH - Declaração\n[alert]\n{alerts}\n\
             [retry]\nmaxLoginChecks = 2\n\
             [time]\nrefreshSchedulePage = 5\nwaitForLogin = 5\nwebdriver.implicitywait = 3\n\
             [uri]\nurl.login = https://p.example/login\nurl.schedule = https://p.example/agenda\n\
             path.webdriver =\n{extra}"
        );
        text.parse().unwrap()
    }

    #[test]
    fn keeps_configured_order() {
        let config = config(
            "alert.1 = sound\nalert.2 = console",
            "[alert.sound]\nplayer = mpg123\n\
             file.loginRequired = a.mp3\nfile.scheduleFound = b.mp3\n",
        );

        let dispatcher = build_dispatcher(&config).unwrap();

        assert_eq!(dispatcher.sender_ids(), ["sound", "console"]);
    }

    #[test]
    fn unknown_sender_fails_fast() {
        let config = config("alert.1 = console\nalert.2 = alerts.player.SoundAlertPlayer", "");

        match build_senders(&config) {
            Err(WatchError::Config(msg)) => {
                assert!(msg.contains("alerts.player.SoundAlertPlayer"));
                assert!(msg.contains("console, sound, webhook, email"));
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("unknown sender was accepted"),
        }
    }

    #[test]
    fn sender_without_settings_fails_fast() {
        let config = config("alert.1 = sound", "");
        assert!(matches!(build_senders(&config), Err(WatchError::Config(_))));
    }

    #[test]
    fn no_senders_is_allowed() {
        let config = config("", "");
        assert!(build_dispatcher(&config).unwrap().is_empty());
    }
}
