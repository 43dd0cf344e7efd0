//! Error types for XML tree parsing.

use thiserror::Error;

/// Errors produced while turning XML text into an [`XmlDocument`](crate::XmlDocument).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// The underlying tokenizer rejected the input.
    #[error("XML syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A closing tag did not match the innermost open element.
    #[error("unbalanced XML at line {line}: expected </{expected}>, found </{found}>")]
    Unbalanced {
        line: usize,
        expected: String,
        found: String,
    },

    /// The input did not contain a root element.
    #[error("XML input has no root element")]
    NoRoot,
}

impl XmlError {
    /// Line the error was detected on, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            XmlError::Syntax { line, .. } | XmlError::Unbalanced { line, .. } => Some(*line),
            XmlError::NoRoot => None,
        }
    }
}

/// Result type for XML tree operations.
pub type XmlResult<T> = Result<T, XmlError>;
