use thiserror::Error;

use crate::parse::ParseError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("condition #{index} '{expression}' is invalid: {source}")]
    InvalidCondition {
        index: usize,
        expression: String,
        #[source]
        source: ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn invalid_condition_message() {
        let source = parse("reviewer=bob").unwrap_err();
        let err = CompileError::InvalidCondition {
            index: 2,
            expression: "reviewer=bob".into(),
            source,
        };
        assert_eq!(
            err.to_string(),
            "condition #2 'reviewer=bob' is invalid: parse error at 0..8: unknown attribute 'reviewer'"
        );
    }

    #[test]
    fn invalid_condition_keeps_source() {
        let source = parse("current-time>=25:00").unwrap_err();
        let err = CompileError::InvalidCondition {
            index: 0,
            expression: "current-time>=25:00".into(),
            source,
        };
        let inner = std::error::Error::source(&err).unwrap();
        assert!(inner.to_string().contains("hour 25"));
    }
}
