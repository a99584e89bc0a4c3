//! Status and diagnostics reporting.

use chrono::{DateTime, Utc};
use choropleth::{DiagnosticsSink, Summary, TracingDiagnostics};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Status line shown when the visible layer list is empty.
pub const NO_MAPS_STATUS: &str = "No maps available for this selection.";

/// Receiver for human-readable status lines and structured diagnostics.
pub trait StatusSink: Send + Sync {
    /// Replace the current status line. An empty string clears it.
    fn status(&self, text: &str);

    fn diagnostics(&self, summary: &Summary);
}

/// Status sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatus;

impl StatusSink for TracingStatus {
    fn status(&self, text: &str) {
        if text.is_empty() {
            debug!("Status cleared");
        } else {
            info!(status = %text, "Status");
        }
    }

    fn diagnostics(&self, summary: &Summary) {
        TracingDiagnostics.report(summary);
    }
}

/// How many past status lines a [`StatusBoard`] keeps.
const HISTORY_LEN: usize = 32;

/// Point-in-time view of a [`StatusBoard`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub status: String,
    pub summary: Option<Summary>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct BoardState {
    status: String,
    summary: Option<Summary>,
    updated_at: Option<DateTime<Utc>>,
    history: VecDeque<String>,
}

/// Keeps the latest status line and summary in memory, and logs both.
#[derive(Debug, Default)]
pub struct StatusBoard {
    state: Mutex<BoardState>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        StatusSnapshot {
            status: state.status.clone(),
            summary: state.summary.clone(),
            updated_at: state.updated_at,
        }
    }

    /// Recent status lines, oldest first.
    pub fn history(&self) -> Vec<String> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.history.iter().cloned().collect()
    }
}

impl StatusSink for StatusBoard {
    fn status(&self, text: &str) {
        TracingStatus.status(text);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.status = text.to_string();
        state.updated_at = Some(Utc::now());
        if state.history.len() == HISTORY_LEN {
            state.history.pop_front();
        }
        state.history.push_back(text.to_string());
    }

    fn diagnostics(&self, summary: &Summary) {
        TracingStatus.diagnostics(summary);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.summary = Some(summary.clone());
        state.updated_at = Some(Utc::now());
    }
}

impl DiagnosticsSink for StatusBoard {
    fn report(&self, summary: &Summary) {
        self.diagnostics(summary);
    }
}
