//! Error codes for the uidesc diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Scanner errors
//! - `E1xx` - Structural (tree building) errors
//! - `E2xx` - Schema errors
//! - `E3xx` - Selector errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Scanner Errors (E0xx)
    // =========================================================================
    /// Whitespace between `<` and the tag name.
    E001,

    /// Whitespace between `</` and the tag name.
    E002,

    /// Unexpected content inside an end tag.
    E003,

    /// Unexpected character inside a start tag.
    E004,

    /// A start tag was interrupted by another `<` before its `>`.
    E005,

    /// A quoted attribute value runs to the end of the input.
    E006,

    /// A comment runs to the end of the input.
    E007,

    /// A `<? ... ?>` header runs to the end of the input.
    E008,

    // =========================================================================
    // Structural Errors (E1xx)
    // =========================================================================
    /// End tag does not match the currently open element.
    E100,

    /// Element implicitly closed by its parent's end tag.
    E101,

    /// Element still open at the end of the input.
    E102,

    /// End tag started but never finished with `>`.
    E103,

    /// More than one top-level element in a document.
    E104,

    /// The same attribute appears twice on one element.
    E105,

    // =========================================================================
    // Schema Errors (E2xx)
    // =========================================================================
    /// Child element not declared by the parent's type.
    E200,

    /// `type=` value does not name a known type alternative.
    E201,

    /// A required attribute is missing.
    E202,

    /// Attribute not declared by the element's type.
    E203,

    // =========================================================================
    // Selector Errors (E3xx)
    // =========================================================================
    /// Malformed path-selector expression.
    E300,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            ErrorCode::E007 => "E007",
            ErrorCode::E008 => "E008",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E300 => "E300",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "tag name must directly follow the open bracket",
            ErrorCode::E002 => "end tag name must directly follow the open bracket",
            ErrorCode::E003 => "end tag name expected",
            ErrorCode::E004 => "unexpected character in tag",
            ErrorCode::E005 => "closing bracket missing",
            ErrorCode::E006 => "unterminated attribute value",
            ErrorCode::E007 => "unterminated comment",
            ErrorCode::E008 => "unterminated header",
            ErrorCode::E100 => "end tag mismatch",
            ErrorCode::E101 => "missing end tag",
            ErrorCode::E102 => "expected end tag",
            ErrorCode::E103 => "end tag not appropriately closed",
            ErrorCode::E104 => "multiple top-level elements",
            ErrorCode::E105 => "duplicate attribute",
            ErrorCode::E200 => "unknown element",
            ErrorCode::E201 => "unknown type alternative",
            ErrorCode::E202 => "missing required attribute",
            ErrorCode::E203 => "unknown attribute",
            ErrorCode::E300 => "invalid selector",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
