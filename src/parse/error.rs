use std::fmt;
use std::ops::Range;

use thiserror::Error;

use crate::types::{Attribute, Operator};

/// What went wrong while parsing a condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("empty expression")]
    Empty,

    #[error("expected an attribute name")]
    ExpectedAttribute,

    #[error("unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("expected an operator after '{attribute}'")]
    ExpectedOperator { attribute: Attribute },

    #[error("operator '{operator}' cannot be used with '{attribute}'")]
    IncompatibleOperator {
        attribute: Attribute,
        operator: Operator,
    },

    #[error("'{attribute}' does not accept the '#' count prefix")]
    QuantifierNotAllowed { attribute: Attribute },

    #[error("'{attribute}' does not accept a negation prefix")]
    PrefixNotAllowed { attribute: Attribute },

    #[error("expected a value for '{attribute}'")]
    ExpectedValue { attribute: Attribute },

    #[error("unterminated quoted text")]
    UnterminatedQuote,

    #[error("invalid integer literal")]
    InvalidInteger,

    #[error("malformed time, expected HH:MM")]
    MalformedTime,

    #[error("hour {hour} out of range 0..24")]
    HourOutOfRange { hour: u32 },

    #[error("minute {minute} out of range 0..60")]
    MinuteOutOfRange { minute: u32 },

    #[error("invalid regular expression: {message}")]
    InvalidRegex { message: String },

    #[error("unexpected trailing input")]
    TrailingInput,
}

/// Errors produced when parsing a condition expression.
///
/// Carries the byte span of the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    span: Range<usize>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }

    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Byte range of the offending input within the expression.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at {}..{}: {}",
            self.span.start, self.span.end, self.kind
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::new(
            ParseErrorKind::UnknownAttribute {
                name: "reviewer".into(),
            },
            0..8,
        );
        assert_eq!(
            err.to_string(),
            "parse error at 0..8: unknown attribute 'reviewer'"
        );
    }

    #[test]
    fn incompatible_operator_display() {
        let err = ParseError::new(
            ParseErrorKind::IncompatibleOperator {
                attribute: Attribute::CurrentTime,
                operator: Operator::Eq,
            },
            12..13,
        );
        assert_eq!(
            err.to_string(),
            "parse error at 12..13: operator '=' cannot be used with 'current-time'"
        );
        assert_eq!(err.span(), 12..13);
    }
}
