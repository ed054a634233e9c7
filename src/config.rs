use std::{collections::HashSet, path::Path, str::FromStr, time::Duration};

use anyhow::Context;
use ini::{Ini, ParseOption, Properties};
use reqwest::Url;
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::{WatchError, WatchResult};

pub const DEFAULT_CONFIG_PATH: &str = "./slotwatch.conf";
pub const DEFAULT_UNAVAILABLE_MARKER: &str = "Indisponível";
pub const DEFAULT_LOGIN_TITLE_MARKER: &str = "gov";
const DEFAULT_SMTP_PORT: u16 = 465;

/// The env vars the watcher understands.
#[derive(Debug, Deserialize)]
pub struct WatchEnv {
    slotwatch_config: Option<String>,
}

impl WatchEnv {
    pub fn config_path(&self) -> &str {
        self.slotwatch_config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub key: String,
    pub name: String,
}

/// What to do once the login bound is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginTimeoutPolicy {
    /// Stop the watcher.
    #[default]
    Abort,
    /// Log it and try again on the next refresh.
    SkipCycle,
}

/// Browser bootstrap values. Paths are kept exactly as written in the file.
#[derive(Debug, Clone)]
pub struct NavigatorSettings {
    pub webdriver_path: String,
    pub implicit_wait: Duration,
    pub user_data_path: Option<String>,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            webdriver_path: String::new(),
            implicit_wait: Duration::from_secs(10),
            user_data_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SoundSettings {
    pub player: String,
    pub login_required_file: String,
    pub schedule_found_file: String,
}

#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub target: String,
}

#[derive(Debug, Clone, Default)]
pub struct SenderSettings {
    pub sound: Option<SoundSettings>,
    pub webhook: Option<WebhookSettings>,
    pub email: Option<EmailSettings>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub subjects: Vec<Subject>,
    pub alert_senders: Vec<String>,
    pub login_url: String,
    pub schedule_url: String,
    pub refresh_interval: Duration,
    pub login_wait_interval: Duration,
    pub max_login_retries: u32,
    pub unavailable_marker: String,
    pub login_title_marker: String,
    pub login_timeout_policy: LoginTimeoutPolicy,
    pub navigator: NavigatorSettings,
    pub senders: SenderSettings,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> WatchResult<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file_opt(path, parse_options()).map_err(|e| {
            WatchError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> WatchResult<Self> {
        let subjects = read_subjects(section(ini, "subject")?)?;
        let alert_senders = section(ini, "alert")?
            .iter()
            .map(|(_, sender)| sender.trim().to_string())
            .collect();

        let max_login_retries = parse_number::<u32>(ini, "retry", "maxLoginChecks")?;
        if max_login_retries == 0 {
            return Err(WatchError::Config(
                "[retry] maxLoginChecks must be at least 1".to_string(),
            ));
        }
        let login_timeout_policy = match optional(ini, "retry", "onLoginTimeout") {
            None | Some("abort") => LoginTimeoutPolicy::Abort,
            Some("skip") => LoginTimeoutPolicy::SkipCycle,
            Some(other) => {
                return Err(WatchError::Config(format!(
                    "[retry] onLoginTimeout must be `abort` or `skip`, got `{other}`"
                )));
            }
        };

        Ok(Self {
            subjects,
            alert_senders,
            login_url: absolute_url(ini, "uri", "url.login")?,
            schedule_url: absolute_url(ini, "uri", "url.schedule")?,
            refresh_interval: positive_seconds(ini, "time", "refreshSchedulePage")?,
            login_wait_interval: positive_seconds(ini, "time", "waitForLogin")?,
            max_login_retries,
            unavailable_marker: optional(ini, "match", "unavailable")
                .unwrap_or(DEFAULT_UNAVAILABLE_MARKER)
                .to_string(),
            login_title_marker: optional(ini, "match", "loginTitle")
                .unwrap_or(DEFAULT_LOGIN_TITLE_MARKER)
                .to_string(),
            login_timeout_policy,
            navigator: NavigatorSettings {
                webdriver_path: required(ini, "uri", "path.webdriver")?.to_string(),
                implicit_wait: positive_seconds(ini, "time", "webdriver.implicitywait")?,
                user_data_path: optional(ini, "uri", "path.userdata")
                    .filter(|path| !path.is_empty())
                    .map(str::to_string),
            },
            senders: read_sender_settings(ini)?,
        })
    }
}

impl FromStr for Config {
    type Err = WatchError;

    fn from_str(text: &str) -> WatchResult<Self> {
        let ini = Ini::load_from_str_opt(text, parse_options())
            .map_err(|e| WatchError::Config(format!("cannot parse configuration: {e}")))?;
        Self::from_ini(&ini)
    }
}

/// Values are taken verbatim: no `\` escapes (Windows paths), no quote
/// stripping. Comments must start the line.
fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

fn section<'a>(ini: &'a Ini, name: &str) -> WatchResult<&'a Properties> {
    ini.section(Some(name))
        .ok_or_else(|| WatchError::Config(format!("missing section [{name}]")))
}

fn required<'a>(ini: &'a Ini, section_name: &str, key: &str) -> WatchResult<&'a str> {
    section(ini, section_name)?
        .get(key)
        .map(str::trim)
        .ok_or_else(|| WatchError::Config(format!("missing [{section_name}] {key}")))
}

fn optional<'a>(ini: &'a Ini, section_name: &str, key: &str) -> Option<&'a str> {
    ini.get_from(Some(section_name), key).map(str::trim)
}

fn parse_number<T: std::str::FromStr>(ini: &Ini, section_name: &str, key: &str) -> WatchResult<T> {
    let raw = required(ini, section_name, key)?;
    raw.parse::<T>().map_err(|_| {
        WatchError::Config(format!("[{section_name}] {key} is not a valid number: `{raw}`"))
    })
}

fn positive_seconds(ini: &Ini, section_name: &str, key: &str) -> WatchResult<Duration> {
    match parse_number::<u64>(ini, section_name, key)? {
        0 => Err(WatchError::Config(format!(
            "[{section_name}] {key} must be greater than 0"
        ))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn absolute_url(ini: &Ini, section_name: &str, key: &str) -> WatchResult<String> {
    let raw = required(ini, section_name, key)?;
    Url::parse(raw).map_err(|e| {
        WatchError::Config(format!("[{section_name}] {key} is not an absolute URL: {e}"))
    })?;
    Ok(raw.to_string())
}

fn read_subjects(props: &Properties) -> WatchResult<Vec<Subject>> {
    let mut seen = HashSet::new();
    let mut subjects = Vec::new();
    for (key, name) in props.iter() {
        if !seen.insert(key) {
            return Err(WatchError::Config(format!(
                "subject key `{key}` appears more than once"
            )));
        }
        subjects.push(Subject {
            key: key.to_string(),
            name: name.trim().to_string(),
        });
    }
    if subjects.is_empty() {
        return Err(WatchError::Config(
            "[subject] needs at least one entry".to_string(),
        ));
    }
    Ok(subjects)
}

fn read_sender_settings(ini: &Ini) -> WatchResult<SenderSettings> {
    let sound = match ini.section(Some("alert.sound")) {
        Some(_) => Some(SoundSettings {
            player: required(ini, "alert.sound", "player")?.to_string(),
            login_required_file: required(ini, "alert.sound", "file.loginRequired")?.to_string(),
            schedule_found_file: required(ini, "alert.sound", "file.scheduleFound")?.to_string(),
        }),
        None => None,
    };
    let webhook = match ini.section(Some("alert.webhook")) {
        Some(_) => Some(WebhookSettings {
            url: absolute_url(ini, "alert.webhook", "url")?,
        }),
        None => None,
    };
    let email = match ini.section(Some("alert.email")) {
        Some(_) => Some(EmailSettings {
            smtp_host: required(ini, "alert.email", "smtp.host")?.to_string(),
            smtp_port: match optional(ini, "alert.email", "smtp.port") {
                Some(_) => parse_number(ini, "alert.email", "smtp.port")?,
                None => DEFAULT_SMTP_PORT,
            },
            sender: required(ini, "alert.email", "sender")?.to_string(),
            password: required(ini, "alert.email", "sender.pass")?.to_string(),
            target: required(ini, "alert.email", "target")?.to_string(),
        }),
        None => None,
    };
    Ok(SenderSettings {
        sound,
        webhook,
        email,
    })
}
