//! Debounced syntax-check scheduling.
//!
//! The checker itself (an assembler front end) lives outside the engine and is
//! reached through `SyntaxChecker`. This module only decides *when* to ask and
//! whether an answer still applies: every edit bumps the session revision and
//! reschedules; a result is accepted only if the document has not changed
//! since the request was issued.

use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace};

use crate::EditorSession;
use crate::clock::{Clock, SystemClock};

pub const DEFAULT_SYNTAX_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxReport {
    Success,
    Error {
        line: Option<usize>,
        offset: Option<usize>,
        message: String,
    },
}

impl SyntaxReport {
    pub fn is_success(&self) -> bool {
        matches!(self, SyntaxReport::Success)
    }
}

#[derive(Debug, Error)]
pub enum SyntaxCheckError {
    #[error("syntax checker unavailable: {0}")]
    Unavailable(String),
    #[error("syntax checker failed: {0}")]
    Failed(String),
}

impl From<SyntaxCheckError> for SyntaxReport {
    /// Service failures surface as a report without a location.
    fn from(err: SyntaxCheckError) -> Self {
        SyntaxReport::Error {
            line: None,
            offset: None,
            message: err.to_string(),
        }
    }
}

pub trait SyntaxChecker {
    fn check(&mut self, text: &str, path: Option<&Path>) -> Result<SyntaxReport, SyntaxCheckError>;
}

/// A check issued for a specific document revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxRequest {
    pub revision: u64,
}

pub struct SyntaxCheckSchedule {
    delay: Duration,
    clock: Box<dyn Clock>,
    deadline: Option<Instant>,
    in_flight: Option<SyntaxRequest>,
    report: Option<SyntaxReport>,
}

impl Default for SyntaxCheckSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTAX_DEBOUNCE, Box::new(SystemClock))
    }
}

impl std::fmt::Debug for SyntaxCheckSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxCheckSchedule")
            .field("delay", &self.delay)
            .field("deadline", &self.deadline)
            .field("in_flight", &self.in_flight)
            .field("report", &self.report)
            .finish()
    }
}

impl SyntaxCheckSchedule {
    pub fn new(delay: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            delay,
            clock,
            deadline: None,
            in_flight: None,
            report: None,
        }
    }

    /// The document changed; restart the quiet window.
    pub fn note_change(&mut self, revision: u64) {
        self.deadline = Some(self.clock.now() + self.delay);
        trace!(target: "state.syntax", revision, "rescheduled");
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A request for `revision` once the quiet window has elapsed.
    pub fn due(&mut self, revision: u64) -> Option<SyntaxRequest> {
        let deadline = self.deadline?;
        if self.clock.now() < deadline {
            return None;
        }
        self.deadline = None;
        let request = SyntaxRequest { revision };
        self.in_flight = Some(request);
        Some(request)
    }

    /// Accept `result` for `request` unless the document moved on meanwhile.
    /// Returns true when the report was applied.
    pub fn complete(
        &mut self,
        request: SyntaxRequest,
        current_revision: u64,
        result: Result<SyntaxReport, SyntaxCheckError>,
    ) -> bool {
        if self.in_flight == Some(request) {
            self.in_flight = None;
        }
        if request.revision != current_revision {
            debug!(target: "state.syntax", requested = request.revision, current = current_revision, "stale_result_discarded");
            return false;
        }
        let report = result.unwrap_or_else(SyntaxReport::from);
        trace!(target: "state.syntax", revision = request.revision, success = report.is_success(), "report");
        self.report = Some(report);
        true
    }

    pub fn report(&self) -> Option<&SyntaxReport> {
        self.report.as_ref()
    }

    /// Drop any scheduled or outstanding check (document switch).
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.in_flight = None;
        self.report = None;
    }

    /// Run `checker` synchronously if a check is due for `session`.
    pub fn run_due(&mut self, checker: &mut dyn SyntaxChecker, session: &EditorSession) -> bool {
        let Some(request) = self.due(session.revision()) else {
            return false;
        };
        let text = session.buffer.to_text();
        let result = checker.check(&text, session.path.as_deref());
        self.complete(request, session.revision(), result)
    }
}
