//! vCard parse error types.

use std::fmt;

use crate::error::RfcError;

/// Result type for vCard parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while parsing a line.
///
/// Row-level errors never abort a document: the parser logs them and skips
/// the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Logical line number where the error occurred (1-based).
    pub line: usize,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    /// Creates a missing separator error.
    #[must_use]
    pub fn missing_separator(line: usize) -> Self {
        Self::new(
            ParseErrorKind::MissingSeparator,
            line,
            "no unescaped ':' between name and value",
        )
    }

    /// Creates an invalid property name error.
    #[must_use]
    pub fn invalid_name(line: usize, name: &str) -> Self {
        Self::new(
            ParseErrorKind::InvalidPropertyName,
            line,
            format!("invalid property name: {name:?}"),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for RfcError {
    fn from(error: ParseError) -> Self {
        Self::ParseError(error.to_string())
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line has no name/value separator.
    MissingSeparator,
    /// Invalid property name.
    InvalidPropertyName,
    /// Input ended inside a record.
    UnexpectedEof,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing separator"),
            Self::InvalidPropertyName => write!(f, "invalid property name"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_kind() {
        let err = ParseError::missing_separator(7);
        assert_eq!(
            err.to_string(),
            "line 7: missing separator: no unescaped ':' between name and value"
        );
    }

    #[test]
    fn converts_into_rfc_error() {
        let err: RfcError = ParseError::invalid_name(2, "").into();
        assert!(matches!(err, RfcError::ParseError(msg) if msg.starts_with("line 2")));
    }
}
