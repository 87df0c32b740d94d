use crate::ast::SourceRange;
use crate::level::LintLevel;
use crate::lint::CheckDescriptor;
use serde::Serialize;

/// A single finding produced by a check.
#[derive(Debug, Clone)]
#[must_use]
pub struct Finding {
    pub check: &'static CheckDescriptor,
    pub level: LintLevel,
    pub file: String,
    pub range: SourceRange,
    pub span: Span,
    pub message: String,
    pub notes: Vec<Note>,
    pub fixit: Option<FixIt>,
}

/// Secondary note attached to a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub message: String,
    /// The standard-library alternative this note is about, for notes that
    /// belong to a standard ladder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

impl Note {
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            alternative: None,
        }
    }
}

/// Proposed literal replacement of a source range. Never applied by this
/// crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixIt {
    pub range: SourceRange,
    pub original: String,
    pub replacement: String,
}

/// Span in a C++ source file (1-based row/column positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Single position in a C++ source file (1-based row/column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

/// Append-only destination of findings.
pub trait DiagnosticSink {
    fn emit(&mut self, finding: Finding);
}

impl DiagnosticSink for Vec<Finding> {
    fn emit(&mut self, finding: Finding) {
        self.push(finding);
    }
}
