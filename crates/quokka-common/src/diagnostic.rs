//! Recoverable diagnostics and the reporters that receive them.
//!
//! Nothing a scanner or balancer finds in a document is fatal. Every problem
//! becomes a [`Diagnostic`] handed to an [`ErrorReporter`], and parsing goes on.

use std::cell::RefCell;
use std::fmt;

use serde::Serialize;
use strum_macros::Display;

use crate::warning::warn_once;

/// Error domain printed in front of message keys by [`Diagnostic::simple_format`].
pub const ERROR_DOMAIN: &str = "quokka/html";

/// How serious a diagnostic is. Neither severity stops parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Input is unusual but the output is what the author most likely meant.
    Warning,
    /// Input is malformed; the output is a best-effort recovery.
    Error,
}

/// One reported problem: a stable message key plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Component that raised the diagnostic (e.g. `"Scanner"`).
    pub component: &'static str,
    /// Stable key such as `HTML1006`.
    pub key: &'static str,
    /// Warning or error.
    pub severity: Severity,
    /// Human-readable message with arguments already substituted.
    pub message: String,
    /// Positional arguments, in key order.
    pub args: Vec<String>,
}

impl Diagnostic {
    /// `domain#key` followed by tab-separated arguments.
    #[must_use]
    pub fn simple_format(&self) -> String {
        let mut out = format!("{ERROR_DOMAIN}#{}", self.key);
        for arg in &self.args {
            out.push('\t');
            out.push_str(arg);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.key, self.message)
    }
}

/// Receiver of recoverable diagnostics.
///
/// Reporters take `&self` so one instance can be shared (behind an `Rc`)
/// between the scanner and the balancer of a single parse.
pub trait ErrorReporter {
    /// Record or display one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// Default reporter: prints each distinct diagnostic once via [`warn_once`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WarnOnceReporter;

impl ErrorReporter for WarnOnceReporter {
    fn report(&self, diagnostic: Diagnostic) {
        let _ = warn_once(diagnostic.component, &diagnostic.to_string());
    }
}

/// Reporter that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ErrorReporter for SilentReporter {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Reporter that keeps every diagnostic for later inspection.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingReporter {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Keys of everything reported so far, in order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.diagnostics.borrow().iter().map(|d| d.key).collect()
    }

    /// Remove and return everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagnostic {
        Diagnostic {
            component: "Scanner",
            key: "HTML1006",
            severity: Severity::Warning,
            message: "unknown entity reference \"bogus\"".to_string(),
            args: vec!["bogus".to_string()],
        }
    }

    #[test]
    fn test_simple_format() {
        assert_eq!(sample().simple_format(), "quokka/html#HTML1006\tbogus");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "warning HTML1006: unknown entity reference \"bogus\""
        );
    }

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::new();
        reporter.report(sample());
        reporter.report(sample());
        assert_eq!(reporter.keys(), vec!["HTML1006", "HTML1006"]);
        assert_eq!(reporter.take().len(), 2);
        assert!(reporter.diagnostics().is_empty());
    }
}
