//! Diagnostics reported by javac and by annotation processors.

use std::{
    fmt,
    io::{self, Write},
    path::PathBuf,
};

use serde::Serialize;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// An error; the reporting stage fails.
    Error,
    /// A warning that doesn't prevent processing but should be addressed.
    Warning,
    /// Informational message.
    Note,
}

impl Severity {
    /// Returns true if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message, optionally anchored to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub source: Option<PathBuf>,
    pub line: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a new note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            source: None,
            line: None,
            message: message.into(),
        }
    }

    /// Anchor this diagnostic at a source line.
    pub fn at(mut self, source: impl Into<PathBuf>, line: u32) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}", source.display())?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Collects diagnostics reported during one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Append a continuation line to the last diagnostic's message.
    pub fn continue_last(&mut self, line: &str) -> bool {
        match self.diagnostics.last_mut() {
            Some(last) => {
                last.message.push('\n');
                last.message.push_str(line);
                true
            }
            None => false,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Write every diagnostic, one per line, in report order.
    pub fn print_to(&self, out: &mut dyn Write) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(out, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("cannot find symbol").at("src/Foo.java", 3);
        assert_eq!(diag.to_string(), "src/Foo.java:3: error: cannot find symbol");

        let diag = Diagnostic::warning("no processor claimed annotation");
        assert_eq!(diag.to_string(), "warning: no processor claimed annotation");
    }

    #[test]
    fn test_collector_counts_errors() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::warning("unchecked"));
        assert!(!collector.has_errors());

        collector.report(Diagnostic::error("';' expected").at("A.java", 1));
        assert!(collector.continue_last("    int x = 1"));
        assert!(collector.has_errors());
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.diagnostics()[1].message, "';' expected\n    int x = 1");
    }

    #[test]
    fn test_collector_print() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::note("Some input files use unchecked operations."));
        collector.report(Diagnostic::error("boom").at("B.java", 9));

        let mut out = Vec::new();
        collector.print_to(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "note: Some input files use unchecked operations.\nB.java:9: error: boom\n"
        );
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Note.to_string(), "note");
    }
}
