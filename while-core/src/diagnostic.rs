//! Structured diagnostics and the sink that collects them.
//!
//! Lexer, parser and checker all report into one [`Diagnostics`] value that
//! the caller owns and passes down by `&mut`. Nothing here aborts a phase;
//! the driver inspects [`Diagnostics::error_count`] afterwards.

use core::fmt;

use log::debug;

use crate::span::{SourceMap, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Note => f.write_str("note"),
        }
    }
}

/// Which phase rule produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// No token rule matches an input character.
    Lex,
    /// The parser expected one element and found another.
    Parse,
    /// A name was declared twice in one scope frame.
    Redeclaration,
    /// A name was used without a visible declaration.
    Undeclared,
    /// An operand, initializer or condition has the wrong type.
    TypeMismatch,
}

/// A secondary message attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: String,
    pub notes: Vec<Note>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            span,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, span: Span, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }

    /// Render as one line for the error plus one line per note.
    pub fn render(&self, files: &SourceMap) -> String {
        let mut out = format!(
            "{}: {}: {}",
            self.span.display(files),
            self.severity,
            self.message
        );
        for note in &self.notes {
            out.push('\n');
            out.push_str(&format!(
                "{}: {}: {}",
                note.span.display(files),
                Severity::Note,
                note.message
            ));
        }
        out
    }
}

/// Accumulates diagnostics for one compile run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    errors: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        debug!(
            "recorded {} {:?}: {}",
            diagnostic.severity, diagnostic.kind, diagnostic.message
        );
        if diagnostic.severity == Severity::Error {
            self.errors += 1;
        }
        self.items.push(diagnostic);
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of recorded errors of the given kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Error && d.kind == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render every diagnostic, one line per error or note.
    pub fn render(&self, files: &SourceMap) -> String {
        self.items
            .iter()
            .map(|d| d.render(files))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = core::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
