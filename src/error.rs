use thiserror::Error;

/// Everything that can stop a cycle or the whole watcher.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("could not start the browser: {0}")]
    NavigatorInit(String),
    #[error("page navigation failed: {0}")]
    Navigation(String),
    #[error("still not logged in after {attempts} login checks")]
    LoginTimeout { attempts: u32 },
}

impl WatchError {
    /// Process exit code for errors that terminate the watcher.
    pub fn exit_code(&self) -> i32 {
        match self {
            WatchError::Config(_) => 1,
            WatchError::NavigatorInit(_) => 2,
            WatchError::LoginTimeout { .. } => 3,
            WatchError::Navigation(_) => 4,
        }
    }
}

/// A schedule table row that does not carry the subject and availability cells.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {index} has {cells} cell(s), expected at least 2")]
pub struct ScanRowError {
    pub index: usize,
    pub cells: usize,
}

/// One alert channel failed to deliver an event.
#[derive(Error, Debug)]
#[error("alert sender `{sender}` failed: {reason}")]
pub struct SenderError {
    pub sender: String,
    pub reason: String,
}

pub type WatchResult<T> = std::result::Result<T, WatchError>;
