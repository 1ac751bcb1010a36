//! Error accumulation for validation runs
//!
//! Validators and the track file reader report into an [`ErrorLogger`]
//! instead of deciding presentation themselves. The logger is cheap to
//! clone; clones share the same entries.

use crate::compliance::{ComplianceViolation, Rule};
use crate::error::{ErrorKind, MxfError};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Severity of a logged error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational, the file is still usable
    Warning,
    /// A rule failed, but parsing could continue
    NonFatal,
    /// Parsing of the resource was aborted
    Fatal,
}

/// Where an error was found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub byte_offset: Option<u64>,
    pub object_uid: Option<Uuid>,
    pub rule: Option<Rule>,
}

/// One logged error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
    pub location: ErrorLocation,
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}: {}", self.severity, self.kind, self.message)
    }
}

/// Shared, thread-safe error sink
#[derive(Clone, Default)]
pub struct ErrorLogger {
    inner: Arc<ErrorLoggerInner>,
}

#[derive(Default)]
struct ErrorLoggerInner {
    entries: RwLock<Vec<ErrorEntry>>,
}

impl ErrorLogger {
    /// Create an empty logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an entry
    pub fn log(&self, entry: ErrorEntry) {
        match entry.severity {
            Severity::Warning => tracing::debug!(
                kind = %entry.kind,
                offset = ?entry.location.byte_offset,
                "{}",
                entry.message
            ),
            Severity::NonFatal | Severity::Fatal => tracing::info!(
                severity = ?entry.severity,
                kind = %entry.kind,
                offset = ?entry.location.byte_offset,
                "{}",
                entry.message
            ),
        }
        self.inner.entries.write().push(entry);
    }

    /// Log an error returned by a parsing step
    pub fn log_error(&self, severity: Severity, err: &MxfError) {
        if let MxfError::Compliance(violations) = err {
            for violation in violations {
                self.log_violation(severity, violation);
            }
            return;
        }
        let object_uid = match err {
            MxfError::DanglingReference { source_uid, .. } => Some(*source_uid),
            _ => None,
        };
        self.log(ErrorEntry {
            severity,
            kind: err.kind(),
            message: err.to_string(),
            location: ErrorLocation {
                byte_offset: err.byte_offset(),
                object_uid,
                rule: None,
            },
        });
    }

    /// Log one compliance violation
    pub fn log_violation(&self, severity: Severity, violation: &ComplianceViolation) {
        self.log(ErrorEntry {
            severity,
            kind: ErrorKind::ComplianceViolation,
            message: violation.to_string(),
            location: ErrorLocation {
                byte_offset: violation.byte_offset,
                object_uid: violation.object_uid,
                rule: Some(violation.rule),
            },
        });
    }

    /// All entries in logging order
    pub fn errors(&self) -> Vec<ErrorEntry> {
        self.inner.entries.read().clone()
    }

    /// Entries of one kind
    pub fn entries_of_kind(&self, kind: ErrorKind) -> Vec<ErrorEntry> {
        self.inner
            .entries
            .read()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// True if any entry is fatal
    pub fn has_fatal_errors(&self) -> bool {
        self.inner
            .entries
            .read()
            .iter()
            .any(|e| e.severity == Severity::Fatal)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// True if nothing was logged
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.inner.entries.write().clear();
    }
}

impl fmt::Debug for ErrorLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogger").field("len", &self.len()).finish()
    }
}
