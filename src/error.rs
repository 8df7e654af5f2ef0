//! Error types for the XML core

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, XmlError>;

/// Everything that can go wrong between raw text and a usable model.
///
/// Parse errors are recoverable: the session drops its model and waits for
/// the next `set_content` call.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Syntax error reported by the XML reader
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { message: String, position: usize },

    #[error("mismatched end tag at byte {position}: expected </{expected}>, found </{found}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("element <{name}> opened at byte {position} is never closed")]
    UnclosedElement { name: String, position: usize },

    #[error("unexpected end tag </{name}> at byte {position}")]
    UnexpectedEndTag { name: String, position: usize },

    #[error("document contains no element")]
    EmptyDocument,

    /// An operation needed a parsed document but the last parse failed
    #[error("no parsed document available")]
    NoDocument,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl XmlError {
    /// Byte offset in the source text the error points at, if any
    pub fn position(&self) -> Option<usize> {
        match self {
            XmlError::Syntax { position, .. }
            | XmlError::MismatchedEndTag { position, .. }
            | XmlError::UnclosedElement { position, .. }
            | XmlError::UnexpectedEndTag { position, .. } => Some(*position),
            XmlError::EmptyDocument | XmlError::NoDocument | XmlError::Io(_) => None,
        }
    }
}
