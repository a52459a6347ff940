//! Export Reconciler
//!
//! Recombines the original document with the rotation ledger. The source
//! bytes are never modified: each export re-parses them, so a failed or
//! repeated export always starts from the original.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::edits::RotationLedger;
use crate::error::{ExportFailure, ExportResult};
use crate::pdf::{EditableDocument, LoadOptions, PdfBackend};
use crate::rotation::Rotation;

/// Rotation written to one page during export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRotationChange {
    pub index: usize,
    /// Rotation the page carried in the source document
    pub original: Rotation,
    /// Delta requested by the user
    pub delta: Rotation,
    /// `original + delta`, written back to the page
    pub composed: Rotation,
}

/// Compose every page's intrinsic rotation with its ledger delta.
///
/// The document must have exactly as many pages as the ledger has entries.
pub fn reconcile<D: EditableDocument>(
    document: &mut D,
    ledger: &RotationLedger,
) -> ExportResult<Vec<PageRotationChange>> {
    let page_count = document.page_count();
    if page_count != ledger.len() {
        return Err(ExportFailure::PageCountMismatch {
            ledger: ledger.len(),
            document: page_count,
        });
    }

    let mut changes = Vec::with_capacity(page_count);
    for (index, delta) in ledger.iter() {
        let original = document.rotation(index)?;
        let composed = original.compose(delta);
        document.set_rotation(index, composed)?;

        tracing::debug!(
            index,
            original = original.degrees(),
            delta = delta.degrees(),
            composed = composed.degrees(),
            "Composed page rotation"
        );
        changes.push(PageRotationChange {
            index,
            original,
            delta,
            composed,
        });
    }

    Ok(changes)
}

/// Runs the export pass on the blocking pool
pub struct ExportReconciler<B: PdfBackend> {
    backend: Arc<B>,
    options: LoadOptions,
    timeout: Duration,
}

impl<B: PdfBackend> ExportReconciler<B> {
    pub fn new(backend: Arc<B>, options: LoadOptions, timeout: Duration) -> Self {
        Self {
            backend,
            options,
            timeout,
        }
    }

    /// Produce the bytes of the rotated document.
    ///
    /// Either the whole document is composed and serialized, or an error is
    /// returned and no bytes are produced.
    pub async fn export_rotated(
        &self,
        source: Arc<[u8]>,
        ledger: RotationLedger,
    ) -> ExportResult<Vec<u8>> {
        let backend = Arc::clone(&self.backend);
        let options = self.options;

        // Parsing and serializing are CPU-bound; keep them off the async runtime
        let result = timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || {
                let mut document = backend.load(&source, &options)?;
                let changes = reconcile(&mut document, &ledger)?;
                let bytes = document.save()?;
                Ok::<_, ExportFailure>((changes, bytes))
            }),
        )
        .await;

        let (changes, bytes) = match result {
            Ok(join_result) => {
                join_result.map_err(|e| ExportFailure::Task(format!("Task join error: {}", e)))??
            }
            Err(_) => return Err(ExportFailure::Timeout(self.timeout)),
        };

        let rotated = changes.iter().filter(|c| !c.delta.is_identity()).count();
        tracing::info!(
            pages = changes.len(),
            rotated,
            size = bytes.len(),
            "Exported rotated document"
        );

        Ok(bytes)
    }
}
