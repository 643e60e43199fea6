//! Human-facing verification report.
//!
//! The report is an append-only list of status-tagged lines. Cloning a
//! [`Report`] shares the underlying buffer, so the same report can be handed
//! to every handler of a session. Observers are notified of each line as it is
//! appended (the CLI uses one to print lines as they arrive).

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Ok,
    Failed,
    Print,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Failed => "FAILED",
            Self::Print => "PRINT",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub line: String,
    pub status: ReportStatus,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.line)
    }
}

/// Receives report lines as they are appended.
pub trait ReportObserver: Send + Sync {
    fn on_line(&self, line: &ReportLine);
}

#[derive(Default)]
struct ReportInner {
    lines: Vec<ReportLine>,
    observers: Vec<Arc<dyn ReportObserver>>,
}

/// Shared, append-only report sink.
#[derive(Clone, Default)]
pub struct Report {
    inner: Arc<Mutex<ReportInner>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, observer: Arc<dyn ReportObserver>) {
        self.lock().observers.push(observer);
    }

    pub fn add_line(&self, line: impl Into<String>, status: ReportStatus) {
        let entry = ReportLine {
            line: line.into(),
            status,
        };
        let mut inner = self.lock();
        for observer in &inner.observers {
            observer.on_line(&entry);
        }
        inner.lines.push(entry);
    }

    pub fn ok(&self, line: impl Into<String>) {
        self.add_line(line, ReportStatus::Ok);
    }

    pub fn failed(&self, line: impl Into<String>) {
        self.add_line(line, ReportStatus::Failed);
    }

    pub fn print(&self, line: impl Into<String>) {
        self.add_line(line, ReportStatus::Print);
    }

    /// Snapshot of all lines so far.
    pub fn lines(&self) -> Vec<ReportLine> {
        self.lock().lines.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, status: ReportStatus) -> usize {
        self.lock()
            .lines
            .iter()
            .filter(|l| l.status == status)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(ReportStatus::Failed) > 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("lines", &self.lock().lines)
            .finish()
    }
}
