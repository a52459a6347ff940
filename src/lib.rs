//! PDF page rotation editor
//!
//! Loads one PDF into an editing session, tracks per-page rotation edits
//! as quarter-turn deltas and exports a new document with those deltas
//! composed onto each page's existing rotation.
//!
//! # Modules
//!
//! - `edits`: Rotation ledger and the store that mutates it
//! - `export`: Rotated-document reconstruction and download sinks
//! - `pdf`: PDF collaborator traits and the lopdf-backed implementation
//! - `session`: Document session lifecycle, reducer and async editor
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_rotate::{Editor, EditorConfig, LopdfBackend, SourceFile};
//!
//! let mut editor = Editor::new(LopdfBackend, EditorConfig::default());
//! editor.load(SourceFile::new("scan.pdf", bytes)).await?;
//!
//! editor.rotate_page(1)?;
//! editor.rotate_all()?;
//!
//! let file = editor.export().await?;
//! assert_eq!(file.file_name, "rotated.pdf");
//! ```

pub mod config;
pub mod edits;
pub mod error;
pub mod export;
pub mod pdf;
pub mod rotation;
pub mod session;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConfigError, EditorConfig, ExportConfig, LoadConfig};
pub use edits::{RotationEditStore, RotationLedger};
pub use error::{DocumentError, EditError, ExportFailure, LoadFailure};
pub use export::{
    DirectorySink, DownloadSink, ExportReconciler, ExportedFile, PageRotationChange,
};
pub use pdf::{EditableDocument, LoadOptions, LopdfBackend, PdfBackend, SourceFile};
pub use rotation::{RotateDirection, Rotation};
pub use session::{
    Action, DocumentSession, Editor, LoadOutcome, LoadStatus, PageView, PendingLoad,
    SessionError, SessionPhase, SessionState, SessionView,
};
