use crate::combinator::Failure;
use std::borrow::Cow;

/// A syntax error in a GraphQL document.
///
/// Produced from the final [`Failure`] of a parse; carries the failure
/// position and the set of token descriptions that would have been accepted
/// there. Never raised mid-parse: the combinators report failures as values
/// and this type is built only once the whole parse has failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line} column {column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub offset: usize,
    pub expected: Vec<Cow<'static, str>>,
}

impl From<Failure> for SyntaxError {
    fn from(failure: Failure) -> Self {
        Self {
            message: failure.message(),
            line: failure.at.line(),
            column: failure.at.column(),
            offset: failure.at.offset(),
            expected: failure.expected,
        }
    }
}
