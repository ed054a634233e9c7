mod alert;
mod browser;
mod config;
mod console_sender;
mod email_sender;
mod error;
mod log_context;
mod logging;
mod login_guard;
mod navigator;
mod poll_loop;
mod scanner;
mod sender_registry;
mod shutdown;
mod sound_sender;
mod text_manipulators;
mod webhook_sender;

pub use alert::{AlertDispatcher, AlertEvent, AlertKind, AlertSender};
pub use browser::ChromeNavigator;
pub use config::{
    Config, EmailSettings, LoadFromEnv, LoginTimeoutPolicy, NavigatorSettings, SenderSettings,
    SoundSettings, Subject, WatchEnv, WebhookSettings,
};
pub use error::{ScanRowError, SenderError, WatchError, WatchResult};
pub use log_context::LogContext;
pub use logging::{LOG_FILE, init_logging};
pub use login_guard::LoginGuard;
pub use navigator::{PageNavigator, ScheduleRow, SessionState, TableRow};
pub use poll_loop::{CycleReport, PollLoop, PollPhase};
pub use scanner::{AvailabilityScanner, Match};
pub use sender_registry::{build_dispatcher, build_senders, known_senders};
pub use shutdown::ShutdownSignals;
pub use text_manipulators::extract_schedule_rows;
