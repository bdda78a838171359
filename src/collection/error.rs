//! Error types for collection operations.

use thiserror::Error;

use super::ValueKind;

/// Errors raised by the collection model when a value cannot take part in an
/// operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    /// The value is a scalar where a container was required.
    ///
    /// This error occurs when linearizing, reassembling or mapping over a
    /// `Bool`, `Int`, `Float` or `Str` value.
    #[error("expected a collection, found {0}")]
    NotACollection(ValueKind),
}

/// A specialized `Result` type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;
