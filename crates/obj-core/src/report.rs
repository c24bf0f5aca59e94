//! Operation reports

use serde::{Deserialize, Serialize};

use crate::{Error, ErrorKind};

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    /// Request was valid but the object was dropped because it was marked
    /// `ignore_on_error` and failed
    Ignored,
    Deleted,
    Failed,
}

/// Result of one create or delete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Short messages for the caller
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Extended detail, one entry per error
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    /// Informational messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl OperationReport {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            kind: None,
            errors: Vec::new(),
            diagnostics: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn created() -> Self {
        Self::with_outcome(Outcome::Created)
    }

    pub fn deleted() -> Self {
        Self::with_outcome(Outcome::Deleted)
    }

    pub fn ignored(note: impl Into<String>) -> Self {
        let mut report = Self::with_outcome(Outcome::Ignored);
        report.notes.push(note.into());
        report
    }

    /// Report for a failed operation.
    pub fn failed(err: &Error) -> Self {
        let mut report = Self::with_outcome(Outcome::Failed);
        report.kind = Some(err.kind());

        for diagnostic in err.diagnostics() {
            report
                .diagnostics
                .push(diagnostic.detail.clone().unwrap_or_else(|| err.extended()));
            report.errors.push(diagnostic.message);
        }
        report
    }

    pub fn is_success(&self) -> bool {
        self.outcome != Outcome::Failed
    }
}

impl From<Error> for OperationReport {
    fn from(err: Error) -> Self {
        Self::failed(&err)
    }
}
