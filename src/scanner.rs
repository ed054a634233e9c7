use log::{debug, info, warn};

use crate::{
    config::Subject,
    log_context::LogContext,
    navigator::{ScheduleRow, TableRow},
};

/// A watched subject that shows a bookable slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub subject_key: String,
    pub subject_name: String,
    pub availability_text: String,
}

pub struct AvailabilityScanner {
    unavailable_marker: String,
}

impl AvailabilityScanner {
    pub fn new(unavailable_marker: impl Into<String>) -> Self {
        Self {
            unavailable_marker: unavailable_marker.into(),
        }
    }

    /// Every (subject, row) pair whose subject cell equals the subject name and
    /// whose availability cell is not the unavailable marker. Both comparisons
    /// are exact. Ordered by subject, then by row.
    pub fn scan(&self, rows: &[ScheduleRow], subjects: &[Subject]) -> Vec<Match> {
        subjects
            .iter()
            .flat_map(|subject| {
                rows.iter()
                    .filter(move |row| {
                        row.subject_text == subject.name
                            && row.availability_text != self.unavailable_marker
                    })
                    .map(move |row| Match {
                        subject_key: subject.key.clone(),
                        subject_name: subject.name.clone(),
                        availability_text: row.availability_text.clone(),
                    })
            })
            .collect()
    }

    /// Like [`scan`](Self::scan), but starts from the raw table and skips rows
    /// that lack the two expected cells.
    pub fn scan_table(
        &self,
        table: &[TableRow],
        subjects: &[Subject],
        ctx: LogContext,
    ) -> Vec<Match> {
        debug!("[{ctx}] Got {} rows", table.len());
        let rows: Vec<ScheduleRow> = table
            .iter()
            .filter_map(|row| match ScheduleRow::try_from(row) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("[{ctx}] Skipping row: {e}");
                    None
                }
            })
            .collect();

        for subject in subjects {
            info!("[{ctx}] Verifying if there is a spot available to {}", subject.name);
        }
        let matches = self.scan(&rows, subjects);
        if matches.is_empty() {
            info!("[{ctx}] Not found any available spot for the selected subjects");
        }
        matches
    }
}
