//! PDF collaborator traits
//!
//! Format-level operations the editor needs: open bytes, count pages,
//! read and write a page's rotation, serialize.

use crate::error::{DocumentError, LoadFailure};
use crate::rotation::Rotation;

/// Options passed to [`PdfBackend::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Open documents flagged as encrypted instead of rejecting them.
    ///
    /// Only integer page attributes are edited, and those are never
    /// encrypted, so restricted documents can be processed without a
    /// password.
    pub ignore_encryption: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            ignore_encryption: true,
        }
    }
}

/// Opens PDF bytes into an editable document
///
/// Implementations are called from blocking worker threads.
pub trait PdfBackend: Send + Sync + 'static {
    type Document: EditableDocument;

    /// Parse `bytes` into a document
    fn load(&self, bytes: &[u8], options: &LoadOptions) -> Result<Self::Document, LoadFailure>;
}

/// An opened document whose page rotations can be edited
pub trait EditableDocument: Send + 'static {
    /// Number of pages in document order
    fn page_count(&self) -> usize;

    /// Intrinsic rotation of the page at `index`, including inherited values
    fn rotation(&self, index: usize) -> Result<Rotation, DocumentError>;

    /// Set the rotation of the page at `index`
    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<(), DocumentError>;

    /// Serialize the whole document
    fn save(&mut self) -> Result<Vec<u8>, DocumentError>;
}
