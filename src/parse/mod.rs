mod error;
mod grammar;

pub use error::{ParseError, ParseErrorKind};
pub(crate) use grammar::check;

use crate::types::Condition;

/// Parse one condition expression such as `-label=wip`, `#files>3` or
/// `status-success~=ci/.*` into a [`Condition`].
///
/// Parsing is all-or-nothing: any malformed token, unknown attribute,
/// operator the attribute does not accept, or out-of-range literal yields a
/// [`ParseError`] pointing at the offending span.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid condition.
pub fn parse(input: &str) -> Result<Condition, ParseError> {
    let result = grammar::condition(input);
    match &result {
        Ok(condition) => tracing::trace!(expression = input, %condition, "parsed condition"),
        Err(err) => tracing::debug!(expression = input, %err, "rejected condition"),
    }
    result
}
