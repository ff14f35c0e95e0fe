//! Severity levels for diagnostics.

use std::fmt;

/// The category of a diagnostic.
///
/// None of the categories abort parsing; they only tell the host how to
/// present the annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The markup is invalid and the engine cannot interpret it as written.
    Error,

    /// The markup is suspicious but still interpretable.
    Warning,

    /// Informational; typically content outside the known schema.
    Message,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Returns `true` if this is an informational message.
    pub fn is_message(&self) -> bool {
        matches!(self, Severity::Message)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Message => write!(f, "message"),
        }
    }
}
