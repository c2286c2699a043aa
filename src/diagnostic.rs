//! Diagnostics: what went wrong, where, and how badly.
//!
//! Generation and rendering are kept apart. The parser, the template
//! evaluator and the pipeline only ever *produce* [`Diagnostic`] values;
//! the `Display` impl and [`write_all`] turn them into text for a terminal. This keeps
//! every producer testable without capturing output streams.
//!
//! ## Format
//!
//! ```text
//! posts.mdesk:12:5: error: unknown variable `author`
//! ```
//!
//! Lines and columns are 1-based; columns count characters, not bytes.

use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// How serious a diagnostic is.
///
/// Ordered so that `max()` over a list yields the worst one. Anything at or
/// above [`Severity::Error`] in the configuration document aborts the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn is_error(self) -> bool {
        self >= Severity::Error
    }

    fn label(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A human-readable position in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLoc {
    pub file: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, in characters
    pub column: usize,
}

impl SourceLoc {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Compute the location of a byte offset within `source`.
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a
    /// multi-byte character resolve to that character's column.
    pub fn from_offset(file: impl Into<String>, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source.as_bytes()[..offset];
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |p| p + 1);
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = String::from_utf8_lossy(&before[line_start..]).chars().count() + 1;
        Self::new(file, line, column)
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub loc: SourceLoc,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, loc: SourceLoc, message: impl Into<String>) -> Self {
        Self {
            severity,
            loc,
            message: message.into(),
        }
    }

    pub fn error(loc: SourceLoc, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, loc, message)
    }

    pub fn warning(loc: SourceLoc, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, loc, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.loc, self.severity, self.message)
    }
}

/// Worst severity in a list, or `None` for an empty list.
pub fn max_severity(diagnostics: &[Diagnostic]) -> Option<Severity> {
    diagnostics.iter().map(|d| d.severity).max()
}

/// True if any diagnostic is at or above [`Severity::Error`].
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    max_severity(diagnostics).is_some_and(Severity::is_error)
}

/// Write every diagnostic, one per line, in order.
pub fn write_all<'a, W: Write>(
    out: &mut W,
    diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
) -> io::Result<()> {
    for diagnostic in diagnostics {
        writeln!(out, "{diagnostic}")?;
    }
    Ok(())
}
