//! Shared issue log.
//!
//! Connector operations report data quality problems and failures here before
//! returning. Every issue is also emitted as a `tracing` event, so an installed
//! subscriber sees the same messages.

use std::sync::{Arc, Mutex};

use crate::errors::{CoverageError, CplErrType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub severity: CplErrType,
    pub message: String,
}

/// Append-only, shareable list of [`Issue`]s.
///
/// Clones share the same underlying log.
#[derive(Clone, Debug, Default)]
pub struct IssueLog {
    issues: Arc<Mutex<Vec<Issue>>>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, severity: CplErrType, message: impl Into<String>) {
        let message = message.into();
        match severity {
            CplErrType::None | CplErrType::Debug => tracing::debug!("{message}"),
            CplErrType::Warning => tracing::warn!("{message}"),
            CplErrType::Failure | CplErrType::Fatal => tracing::error!("{message}"),
        }
        // a poisoned log still holds every issue pushed before the panic
        let mut issues = self.issues.lock().unwrap_or_else(|e| e.into_inner());
        issues.push(Issue { severity, message });
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(CplErrType::Warning, message);
    }

    /// Log `err` as a failure and hand it back, for use in `map_err`/`inspect_err` chains.
    pub fn error(&self, err: CoverageError) -> CoverageError {
        self.log(CplErrType::Failure, err.to_string());
        err
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.issues
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.issues.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.issues.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
