use thiserror::Error;

use crate::parse::ParseError;
use crate::rules::ConfigError;
use crate::CompileError;

/// Unified error type covering expression parsing, condition lists and
/// rule configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_converts() {
        let err: Error = crate::parse::parse("merged=true").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn compile_error_is_transparent() {
        let inner = crate::ConditionSet::parse(["base=main", ""]).unwrap_err();
        let message = inner.to_string();
        let err = Error::from(inner);
        assert_eq!(err.to_string(), message);
    }
}
