//! The core diagnostic type.
//!
//! A [`Diagnostic`] is one annotation on a document: a severity, an
//! optional [`ErrorCode`], a message, the byte span it applies to and
//! optional help text.

use std::fmt;

use crate::{
    error::{ErrorCode, Severity},
    span::Span,
};

/// A diagnostic message anchored to a byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    span: Span,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an informational diagnostic.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(Severity::Message, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The primary message.
    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Start byte offset.
    pub fn start(&self) -> usize {
        self.span.start()
    }

    /// End byte offset (exclusive).
    pub fn end(&self) -> usize {
        self.span.end()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            span: Span::default(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::error("test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.text(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.help().is_none());
        assert_eq!(diag.span(), Span::default());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::warning("attribute `foo` is not declared")
            .with_code(ErrorCode::E203)
            .with_span(Span::new(10..13))
            .with_help("remove it");

        assert!(diag.severity().is_warning());
        assert_eq!(diag.code(), Some(ErrorCode::E203));
        assert_eq!(diag.start(), 10);
        assert_eq!(diag.end(), 13);
        assert_eq!(diag.help(), Some("remove it"));
    }

    #[test]
    fn test_diagnostic_display() {
        let with_code = Diagnostic::error("end tag mismatch").with_code(ErrorCode::E100);
        assert_eq!(with_code.to_string(), "error[E100]: end tag mismatch");

        let without_code = Diagnostic::message("unknown element");
        assert_eq!(without_code.to_string(), "message: unknown element");
    }
}
