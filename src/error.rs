//! Caller-visible failures of catalog operations.
//!
//! Absent items are not errors (lookups return `Option`), and loose search
//! parameters are clamped rather than rejected. Only malformed batch requests
//! and a catalog that cannot be loaded at all surface here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The request shape is unacceptable (batch too large, ids not an array).
    #[error("validation error: {0}")]
    Validation(String),

    /// No snapshot could be loaded and none was cached.
    #[error("item catalog unavailable: {0}")]
    Unavailable(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
