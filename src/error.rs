//! Structured error types for gridview.
//!
//! The core itself has no fatal paths: geometry is clamped, full caches stop
//! accepting entries, and malformed cell data renders as empty text. Errors
//! exist only at the crate edges: invalid cell references and unknown sheet
//! lookups.

/// All errors that can occur at the gridview API surface.
#[derive(Debug, thiserror::Error)]
pub enum GridViewError {
    /// Invalid cell reference (A1 notation).
    #[error("invalid cell reference: {0}")]
    CellRef(String),

    /// Sheet name not present in the workbook.
    #[error("unknown sheet: {0}")]
    UnknownSheet(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridViewError>;

impl From<String> for GridViewError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridViewError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
