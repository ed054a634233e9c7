use async_trait::async_trait;

use crate::error::{ScanRowError, WatchResult};

/// One `tr` of the schedule table as the page rendered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub index: usize,
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(index: usize, cells: Vec<String>) -> Self {
        Self { index, cells }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub subject_text: String,
    pub availability_text: String,
}

impl ScheduleRow {
    pub fn new(subject_text: impl Into<String>, availability_text: impl Into<String>) -> Self {
        Self {
            subject_text: subject_text.into(),
            availability_text: availability_text.into(),
        }
    }
}

impl TryFrom<&TableRow> for ScheduleRow {
    type Error = ScanRowError;

    // Extra cells are ignored, only the first two carry subject and date.
    fn try_from(row: &TableRow) -> Result<Self, Self::Error> {
        match row.cells.as_slice() {
            [subject, availability, ..] => Ok(ScheduleRow::new(subject, availability)),
            cells => Err(ScanRowError {
                index: row.index,
                cells: cells.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    RequiresLogin,
}

impl SessionState {
    pub fn evaluate(current_url: &str, title: &str, login_url: &str, title_marker: &str) -> Self {
        if current_url == login_url || title.contains(title_marker) {
            SessionState::RequiresLogin
        } else {
            SessionState::Authenticated
        }
    }
}

/// The browser session the watcher drives.
#[async_trait]
pub trait PageNavigator: Send + Sync {
    async fn navigate(&mut self, url: &str) -> WatchResult<()>;

    async fn current_url(&self) -> WatchResult<String>;

    async fn page_title(&self) -> WatchResult<String>;

    /// Data rows of the schedule table, header excluded, in page order.
    async fn rows(&self) -> WatchResult<Vec<TableRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN: &str = "https://portal.example/login";

    #[test]
    fn login_page_url_requires_login() {
        let state = SessionState::evaluate(LOGIN, "Agendamento", LOGIN, "gov");
        assert_eq!(state, SessionState::RequiresLogin);
    }

    #[test]
    fn title_marker_requires_login() {
        let state =
            SessionState::evaluate("https://sso.example/auth", "Acesso gov.br", LOGIN, "gov");
        assert_eq!(state, SessionState::RequiresLogin);
    }

    #[test]
    fn other_pages_are_authenticated() {
        let state = SessionState::evaluate(
            "https://portal.example/agenda",
            "Agendamento",
            LOGIN,
            "gov",
        );
        assert_eq!(state, SessionState::Authenticated);
    }

    #[test]
    fn row_needs_two_cells() {
        let ok = TableRow::new(0, vec!["CNH".into(), "12/05/2024".into(), "extra".into()]);
        assert_eq!(
            ScheduleRow::try_from(&ok),
            Ok(ScheduleRow::new("CNH", "12/05/2024"))
        );

        let short = TableRow::new(3, vec!["CNH".into()]);
        assert_eq!(
            ScheduleRow::try_from(&short),
            Err(ScanRowError { index: 3, cells: 1 })
        );
    }
}
