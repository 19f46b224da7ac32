//! Diagnostic reporting infrastructure.
//!
//! Errors terminate compilation at the end of the phase that raised them and
//! are modeled as `Result` values in the phase crates. Warnings never
//! terminate anything: they accumulate in the [`Handler`] across phases and
//! are printed in the semantic-analysis section of the report.

use crate::Span;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that prevents compilation.
    Error,
    /// A warning that does not prevent compilation.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with severity and source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Diagnostic severity level.
    pub level: Level,
    /// Fully formatted message, including the phase prefix and code.
    pub message: String,
    /// Source location, `Span::DUMMY` when unknown.
    pub span: Span,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
        }
    }

    /// Creates a warning diagnostic.
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }
}

/// Handler for collecting diagnostics over the whole compilation.
///
/// The handler is owned by the driver and passed by shared reference into
/// the phases; `RefCell` gives the phases append access without threading
/// `&mut` through every visitor.
#[derive(Debug)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Creates a new, empty handler.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Records a pre-built diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Records a warning with the given formatted message.
    pub fn warn(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::warning(message, span));
    }

    /// Returns the number of warnings recorded so far.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Returns the formatted messages of all recorded warnings, in order.
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .map(|d| d.message.clone())
            .collect()
    }

    /// Returns a copy of every diagnostic recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Error), "error");
        assert_eq!(format!("{}", Level::Warning), "warning");
    }

    #[test]
    fn test_handler_starts_empty() {
        let handler = Handler::new();
        assert_eq!(handler.warning_count(), 0);
        assert!(handler.warnings().is_empty());
    }

    #[test]
    fn test_handler_accumulates_warnings_in_order() {
        let handler = Handler::new();
        handler.warn("first", Span::DUMMY);
        handler.warn("second", Span::DUMMY);

        assert_eq!(handler.warning_count(), 2);
        assert_eq!(handler.warnings(), vec!["first", "second"]);
    }

    #[test]
    fn test_handler_separates_levels() {
        let handler = Handler::new();
        handler.emit(Diagnostic::new(Level::Error, "boom", Span::DUMMY));
        handler.warn("careful", Span::DUMMY);

        assert_eq!(handler.warning_count(), 1);
        assert_eq!(handler.diagnostics().len(), 2);
    }
}
