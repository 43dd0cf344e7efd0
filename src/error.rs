//! Error types for the document model.
//!
//! Structural and declaration violations surface as [`FoliaError`]. Lookup
//! misses that callers commonly treat as "absent" use [`LookupError`] so they
//! can be matched on without inspecting messages.

use layered_folia_xml::XmlError;
use thiserror::Error;

/// Recoverable absence of requested content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no such annotation: {0}")]
    NoSuchAnnotation(String),

    #[error("no such text: {0}")]
    NoSuchText(String),

    #[error("no such phonetic content: {0}")]
    NoSuchPhon(String),
}

/// Hard failures raised by document operations.
#[derive(Debug, Error)]
pub enum FoliaError {
    /// Attribute or structural misuse not tied to declarations.
    #[error("value error: {0}")]
    Value(String),

    /// Missing, ambiguous or colliding (annotation type, set) declaration.
    #[error("declaration error: {0}")]
    Declaration(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// Occurrence limit of a kind (or kind and set) exceeded at one parent.
    #[error("duplicate annotation: {0}")]
    DuplicateAnnotation(String),

    #[error("inconsistent text: {0}")]
    InconsistentText(String),

    #[error("unresolvable text content: {0}")]
    UnresolvableTextContent(String),

    #[error("no default: {0}")]
    NoDefault(String),

    #[error("{}", xml_message(.line, .message))]
    Xml { line: Option<usize>, message: String },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FoliaError {
    pub(crate) fn value(message: impl Into<String>) -> Self {
        FoliaError::Value(message.into())
    }

    pub(crate) fn declaration(message: impl Into<String>) -> Self {
        FoliaError::Declaration(message.into())
    }

    pub(crate) fn xml(line: Option<usize>, message: impl Into<String>) -> Self {
        FoliaError::Xml {
            line,
            message: message.into(),
        }
    }

    /// True for misses that callers may treat as absence.
    pub fn is_lookup(&self) -> bool {
        matches!(self, FoliaError::Lookup(_))
    }
}

impl From<XmlError> for FoliaError {
    fn from(err: XmlError) -> Self {
        FoliaError::Xml {
            line: err.line(),
            message: err.to_string(),
        }
    }
}

fn xml_message(line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("xml error at line {}: {}", line, message),
        None => format!("xml error: {}", message),
    }
}

/// Result type for document operations.
pub type FoliaResult<T> = Result<T, FoliaError>;
