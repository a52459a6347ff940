//! Rotated document export
//!
//! ```text
//!   source bytes ──► PdfBackend::load ──► for each page i:
//!                                           R_i  = intrinsic rotation
//!                                           R_i' = R_i + ledger[i] (mod 360)
//!                                           set_rotation(i, R_i')
//!                                     ──► save ──► ExportedFile ──► DownloadSink
//! ```

mod reconciler;
mod sink;

pub use reconciler::{reconcile, ExportReconciler, PageRotationChange};
pub use sink::{DirectorySink, DownloadSink, ExportedFile};
