//! Session state and reducer

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::edits::{RotationEditStore, RotationLedger};
use crate::error::{EditError, ExportFailure, LoadFailure};
use crate::pdf::SourceFile;
use crate::rotation::RotateDirection;

/// Lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No document, or a selected document whose parse is outstanding
    Empty,
    /// Page count known, rotation ledger active
    Loaded,
    /// Loading failed; cleared only by an explicit reset or a new selection
    Errored,
}

/// User-visible failure kept in session state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadFailure),

    #[error(transparent)]
    Export(#[from] ExportFailure),
}

/// The selected source file and what is known about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSession {
    pub id: Uuid,
    pub source: SourceFile,
    /// `None` until parsing completes
    pub page_count: Option<NonZeroUsize>,
    pub selected_at: DateTime<Utc>,
    /// Load generation this session was selected under
    pub generation: u64,
}

/// Inputs to the session reducer
#[derive(Debug, Clone)]
pub enum Action {
    SelectFile(SourceFile),
    LoadSucceeded {
        generation: u64,
        page_count: NonZeroUsize,
    },
    LoadFailed {
        generation: u64,
        failure: LoadFailure,
    },
    RotatePage(usize),
    RotatePageTowards(usize, RotateDirection),
    RotateAll,
    RotateAllTowards(RotateDirection),
    RevertEdits,
    ExportSucceeded,
    ExportFailed(ExportFailure),
    Reset,
}

/// Complete editor state: document session, rotation edits and the last
/// user-visible error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    document: Option<DocumentSession>,
    edits: RotationEditStore,
    /// Incremented on every file selection; never reset
    generation: u64,
    error: Option<SessionError>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next state for `action`.
    ///
    /// Rejected edits leave the state unchanged.
    pub fn reduce(mut self, action: Action) -> Self {
        if let Err(e) = self.apply(action) {
            tracing::debug!(error = %e, "Edit had no effect");
        }
        self
    }

    /// In-place form of [`reduce`](Self::reduce) that reports rejected edits
    pub fn apply(&mut self, action: Action) -> Result<(), EditError> {
        match action {
            Action::SelectFile(source) => {
                self.select(source);
                Ok(())
            }
            Action::LoadSucceeded {
                generation,
                page_count,
            } => {
                self.load_succeeded(generation, page_count);
                Ok(())
            }
            Action::LoadFailed {
                generation,
                failure,
            } => {
                self.load_failed(generation, failure);
                Ok(())
            }
            Action::RotatePage(index) => self.edits.rotate_page(index).map(|_| ()),
            Action::RotatePageTowards(index, direction) => self
                .edits
                .rotate_page_towards(index, direction)
                .map(|_| ()),
            Action::RotateAll => self.edits.rotate_all(),
            Action::RotateAllTowards(direction) => self.edits.rotate_all_towards(direction),
            Action::RevertEdits => self.edits.revert(),
            Action::ExportSucceeded => {
                if matches!(self.error, Some(SessionError::Export(_))) {
                    self.error = None;
                }
                Ok(())
            }
            Action::ExportFailed(failure) => {
                // Session and ledger stay so the export can be retried
                if self.phase() == SessionPhase::Loaded {
                    self.error = Some(SessionError::Export(failure));
                }
                Ok(())
            }
            Action::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    fn select(&mut self, source: SourceFile) {
        self.generation += 1;
        let session = DocumentSession {
            id: Uuid::new_v4(),
            source,
            page_count: None,
            selected_at: Utc::now(),
            generation: self.generation,
        };

        tracing::info!(
            session_id = %session.id,
            generation = self.generation,
            file_name = %session.source.name(),
            size = session.source.len(),
            fingerprint = %session.source.fingerprint(),
            "Selected document"
        );

        self.document = Some(session);
        self.edits.reset();
        self.error = None;
    }

    fn load_succeeded(&mut self, generation: u64, page_count: NonZeroUsize) {
        let Some(document) = self.pending_document_mut(generation) else {
            tracing::warn!(generation, "Discarding result of a superseded parse");
            return;
        };

        document.page_count = Some(page_count);
        tracing::info!(
            session_id = %document.id,
            page_count = page_count.get(),
            "Document loaded"
        );
        self.edits.initialize(page_count);
    }

    fn load_failed(&mut self, generation: u64, failure: LoadFailure) {
        let Some(document) = self.pending_document_mut(generation) else {
            tracing::warn!(
                generation,
                error = %failure,
                "Discarding failure of a superseded parse"
            );
            return;
        };

        tracing::error!(
            session_id = %document.id,
            file_name = %document.source.name(),
            error = %failure,
            "Failed to load document"
        );
        self.document = None;
        self.edits.reset();
        self.error = Some(SessionError::Load(failure));
    }

    fn reset(&mut self) {
        if let Some(document) = &self.document {
            tracing::info!(session_id = %document.id, "Removed document");
        }
        self.document = None;
        self.edits.reset();
        self.error = None;
    }

    /// The document selected under `generation`, if it is still waiting
    /// for its parse
    fn pending_document_mut(&mut self, generation: u64) -> Option<&mut DocumentSession> {
        self.document
            .as_mut()
            .filter(|d| d.generation == generation && d.page_count.is_none())
    }

    pub fn phase(&self) -> SessionPhase {
        if matches!(self.error, Some(SessionError::Load(_))) {
            return SessionPhase::Errored;
        }
        match &self.document {
            Some(document) if document.page_count.is_some() => SessionPhase::Loaded,
            _ => SessionPhase::Empty,
        }
    }

    pub fn document(&self) -> Option<&DocumentSession> {
        self.document.as_ref()
    }

    pub fn edits(&self) -> &RotationEditStore {
        &self.edits
    }

    pub fn ledger(&self) -> Option<&RotationLedger> {
        self.edits.ledger()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Generation of the most recent file selection
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a parse started under `generation` may still update the state
    pub fn is_awaiting(&self, generation: u64) -> bool {
        self.document
            .as_ref()
            .is_some_and(|d| d.generation == generation && d.page_count.is_none())
    }

    /// Source bytes and ledger as of now, for the export pass
    pub fn export_snapshot(&self) -> Option<(Arc<[u8]>, RotationLedger)> {
        if self.phase() != SessionPhase::Loaded {
            return None;
        }
        let document = self.document.as_ref()?;
        let ledger = self.edits.snapshot()?;
        Some((document.source.shared_bytes(), ledger))
    }
}
