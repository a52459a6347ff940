//! PDF collaborator
//!
//! The editor never touches PDF syntax directly. It goes through
//! [`PdfBackend`] to open a document and [`EditableDocument`] to read and
//! write page rotations and serialize the result. [`LopdfBackend`] is the
//! implementation used in production.

mod lopdf_backend;
mod source;
mod traits;

pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use source::{SourceFile, PDF_CONTENT_TYPE};
pub use traits::{EditableDocument, LoadOptions, PdfBackend};
