//! Error types for loading, editing and exporting
//!
//! Payloads are plain strings so errors are `Clone` and can be kept in
//! session state as the user-visible failure message.

use std::time::Duration;

use thiserror::Error;

/// The source bytes could not be opened as a PDF document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    #[error("Selected file is empty")]
    Empty,

    #[error("{name} is not a PDF document (detected {detected})")]
    NotPdf { name: String, detected: String },

    #[error("Document is encrypted")]
    Encrypted,

    #[error("Document is protected by a user password")]
    PasswordRequired,

    #[error("Failed to parse PDF: {0}")]
    Malformed(String),

    #[error("Document has no pages")]
    NoPages,

    #[error("Parsing timed out after {0:?}")]
    Timeout(Duration),

    #[error("Parse task failed: {0}")]
    Task(String),
}

/// Page-level failure reported by a PDF collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Page {index} not found (document has {page_count} pages)")]
    PageNotFound { index: usize, page_count: usize },

    #[error("Invalid page object at index {index}: {message}")]
    InvalidPage { index: usize, message: String },

    #[error("Failed to serialize document: {0}")]
    Serialize(String),
}

/// Reconstruction of the rotated document failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportFailure {
    #[error("No document is loaded")]
    NoDocument,

    #[error(transparent)]
    Load(#[from] LoadFailure),

    #[error("Rotation ledger has {ledger} entries but the document has {document} pages")]
    PageCountMismatch { ledger: usize, document: usize },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Export timed out after {0:?}")]
    Timeout(Duration),

    #[error("Export task failed: {0}")]
    Task(String),

    #[error("Failed to deliver exported file: {0}")]
    Delivery(String),
}

/// Rotation edit rejected by the edit store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("No document is loaded")]
    NoDocument,

    #[error("Page index {index} out of range (document has {page_count} pages)")]
    PageOutOfRange { index: usize, page_count: usize },
}

/// Result type alias for export operations
pub type ExportResult<T> = std::result::Result<T, ExportFailure>;
