use thiserror::Error;

use std::io;

/// A malformed document.
///
/// Carries enough context to point a user at the offending input: the
/// source it came from (a file path or `"<string>"`), the 1-based line
/// number and the text of that line after comment stripping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name}:{line}: {message}: {text:?}")]
pub struct SyntaxError {
    pub source_name: String,
    pub line: usize,
    pub message: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{0}")]
    Message(String),
}

impl Error {
    /// The syntax error behind this error, if it is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
