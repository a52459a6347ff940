//! Async editor
//!
//! Owns the session state and runs the two suspending operations: parsing
//! a selected file and exporting the rotated document. Everything else is
//! a synchronous reducer step.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::config::EditorConfig;
use crate::error::{EditError, ExportFailure, LoadFailure};
use crate::export::{DownloadSink, ExportReconciler, ExportedFile};
use crate::pdf::{EditableDocument, LoadOptions, PdfBackend, SourceFile};
use crate::rotation::{RotateDirection, Rotation};

use super::state::{Action, SessionState};
use super::view::SessionView;

/// A parse started by [`Editor::select_file`]
///
/// Holds no borrow of the editor, so a newer file can be selected while
/// this one is still parsing. Its outcome is then discarded by
/// [`Editor::complete_load`].
pub struct PendingLoad<B: PdfBackend> {
    generation: u64,
    source: SourceFile,
    backend: Arc<B>,
    options: LoadOptions,
    timeout: Duration,
}

/// Result of a finished parse, tagged with the selection it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub generation: u64,
    pub result: Result<NonZeroUsize, LoadFailure>,
}

/// What [`Editor::complete_load`] did with an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded(NonZeroUsize),
    Failed(LoadFailure),
    /// A newer selection or a reset happened first
    Superseded,
}

impl<B: PdfBackend> PendingLoad<B> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Parse the source and count its pages
    pub async fn parse(self) -> LoadOutcome {
        let result = self.count_pages().await;
        LoadOutcome {
            generation: self.generation,
            result,
        }
    }

    async fn count_pages(&self) -> Result<NonZeroUsize, LoadFailure> {
        self.source.sniff()?;

        let bytes = self.source.shared_bytes();
        let backend = Arc::clone(&self.backend);
        let options = self.options;

        let parse_result = timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || {
                let document = backend.load(&bytes, &options)?;
                Ok::<_, LoadFailure>(document.page_count())
            }),
        )
        .await;

        let page_count = match parse_result {
            Ok(join_result) => {
                join_result.map_err(|e| LoadFailure::Task(format!("Task join error: {}", e)))??
            }
            Err(_) => return Err(LoadFailure::Timeout(self.timeout)),
        };

        NonZeroUsize::new(page_count).ok_or(LoadFailure::NoPages)
    }
}

/// Single-document rotation editor
pub struct Editor<B: PdfBackend> {
    backend: Arc<B>,
    config: EditorConfig,
    state: SessionState,
}

impl<B: PdfBackend> Editor<B> {
    pub fn new(backend: B, config: EditorConfig) -> Self {
        Self::with_shared_backend(Arc::new(backend), config)
    }

    pub fn with_shared_backend(backend: Arc<B>, config: EditorConfig) -> Self {
        Self {
            backend,
            config,
            state: SessionState::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> SessionView {
        SessionView::from(&self.state)
    }

    /// Apply a synchronous action to the session
    pub fn dispatch(&mut self, action: Action) -> Result<(), EditError> {
        self.state.apply(action)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Start a new session for `file`; parse it with [`PendingLoad::parse`]
    pub fn select_file(&mut self, file: SourceFile) -> PendingLoad<B> {
        self.record(Action::SelectFile(file.clone()));
        PendingLoad {
            generation: self.state.generation(),
            source: file,
            backend: Arc::clone(&self.backend),
            options: self.config.load.options(),
            timeout: self.config.load.timeout(),
        }
    }

    /// Apply a finished parse unless a newer selection has replaced it
    pub fn complete_load(&mut self, outcome: LoadOutcome) -> LoadStatus {
        if !self.state.is_awaiting(outcome.generation) {
            tracing::warn!(
                generation = outcome.generation,
                current = self.state.generation(),
                "Discarding result of a superseded parse"
            );
            return LoadStatus::Superseded;
        }

        let generation = outcome.generation;
        match outcome.result {
            Ok(page_count) => {
                self.record(Action::LoadSucceeded {
                    generation,
                    page_count,
                });
                LoadStatus::Loaded(page_count)
            }
            Err(failure) => {
                self.record(Action::LoadFailed {
                    generation,
                    failure: failure.clone(),
                });
                LoadStatus::Failed(failure)
            }
        }
    }

    /// Select, parse and apply `file` in one step
    pub async fn load(&mut self, file: SourceFile) -> Result<NonZeroUsize, LoadFailure> {
        let outcome = self.select_file(file).parse().await;
        match self.complete_load(outcome) {
            LoadStatus::Loaded(page_count) => Ok(page_count),
            LoadStatus::Failed(failure) => Err(failure),
            LoadStatus::Superseded => Err(LoadFailure::Task(
                "load superseded by a newer selection".to_string(),
            )),
        }
    }

    /// Remove the document and all edits
    pub fn reset(&mut self) {
        self.record(Action::Reset);
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Rotate one page a quarter-turn clockwise, returning its new delta
    pub fn rotate_page(&mut self, index: usize) -> Result<Rotation, EditError> {
        self.rotate_page_towards(index, RotateDirection::Clockwise)
    }

    pub fn rotate_page_towards(
        &mut self,
        index: usize,
        direction: RotateDirection,
    ) -> Result<Rotation, EditError> {
        self.state.apply(Action::RotatePageTowards(index, direction))?;
        self.state
            .ledger()
            .and_then(|ledger| ledger.get(index))
            .ok_or(EditError::NoDocument)
    }

    /// Rotate every page a quarter-turn clockwise
    pub fn rotate_all(&mut self) -> Result<(), EditError> {
        self.state.apply(Action::RotateAll)
    }

    pub fn rotate_all_towards(&mut self, direction: RotateDirection) -> Result<(), EditError> {
        self.state.apply(Action::RotateAllTowards(direction))
    }

    /// Drop all pending rotations but keep the document
    pub fn revert_edits(&mut self) -> Result<(), EditError> {
        self.state.apply(Action::RevertEdits)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Build the rotated document from the ledger as it is right now.
    ///
    /// Failures are recorded in the session but do not tear it down.
    pub async fn export(&mut self) -> Result<ExportedFile, ExportFailure> {
        let result = self.build_export().await;
        self.record_export(&result);
        result
    }

    /// Export and hand the file to `sink`
    pub async fn export_to<S>(&mut self, sink: &S) -> Result<ExportedFile, ExportFailure>
    where
        S: DownloadSink + ?Sized,
    {
        let file = self.export().await?;
        let delivered = sink.deliver(&file).await.map(|_| file);
        self.record_export(&delivered);
        delivered
    }

    async fn build_export(&self) -> Result<ExportedFile, ExportFailure> {
        let (source, ledger) = self
            .state
            .export_snapshot()
            .ok_or(ExportFailure::NoDocument)?;

        let reconciler = ExportReconciler::new(
            Arc::clone(&self.backend),
            self.config.load.options(),
            self.config.export.timeout(),
        );
        let bytes = reconciler.export_rotated(source, ledger).await?;

        Ok(ExportedFile::new(self.config.export.file_name.clone(), bytes))
    }

    fn record_export(&mut self, result: &Result<ExportedFile, ExportFailure>) {
        match result {
            Ok(_) => self.record(Action::ExportSucceeded),
            Err(failure) => {
                tracing::error!(error = %failure, "Export failed");
                self.record(Action::ExportFailed(failure.clone()));
            }
        }
    }

    /// Apply an action that cannot be rejected
    fn record(&mut self, action: Action) {
        if let Err(e) = self.state.apply(action) {
            tracing::debug!(error = %e, "Action had no effect");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::LopdfBackend;
    use crate::session::{SessionError, SessionPhase};
    use crate::test_support::{
        build_encrypted_pdf, build_pdf, fake_pdf, fake_rotations, page_contents, rotations_of,
        FakeBackend, PAGE_TEXT,
    };
    use tempfile::TempDir;

    fn fake_editor(backend: FakeBackend) -> Editor<FakeBackend> {
        Editor::new(backend, EditorConfig::default())
    }

    fn ledger_degrees<B: PdfBackend>(editor: &Editor<B>) -> Vec<u16> {
        editor
            .state()
            .ledger()
            .unwrap()
            .entries()
            .iter()
            .map(|r| r.degrees())
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_three_pages() {
        let mut editor = Editor::new(LopdfBackend, EditorConfig::default());
        let source = build_pdf(&[None, Some(90), Some(180)]);

        let page_count = editor.load(SourceFile::new("three.pdf", source)).await.unwrap();
        assert_eq!(page_count.get(), 3);

        editor.rotate_page(1).unwrap();
        editor.rotate_all().unwrap();
        assert_eq!(ledger_degrees(&editor), vec![90, 180, 90]);

        let file = editor.export().await.unwrap();
        assert_eq!(file.file_name, "rotated.pdf");
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(rotations_of(&file.bytes), vec![90, 270, 270]);
    }

    #[tokio::test]
    async fn test_encrypted_source_loads() {
        let mut editor = fake_editor(FakeBackend {
            encrypted: true,
            ..Default::default()
        });

        let page_count = editor
            .load(SourceFile::new("locked.pdf", fake_pdf(&[0, 0, 0, 0])))
            .await
            .unwrap();

        assert_eq!(page_count.get(), 4);
        assert_eq!(ledger_degrees(&editor), vec![0; 4]);
    }

    #[tokio::test]
    async fn test_encrypted_lopdf_source_round_trip() {
        let mut editor = Editor::new(LopdfBackend, EditorConfig::default());
        let source = build_encrypted_pdf(&[None, None], "");

        let page_count = editor.load(SourceFile::new("locked.pdf", source)).await.unwrap();
        assert_eq!(page_count.get(), 2);
        assert_eq!(ledger_degrees(&editor), vec![0, 0]);

        editor.rotate_page(1).unwrap();
        let file = editor.export().await.unwrap();

        assert_eq!(rotations_of(&file.bytes), vec![0, 90]);
        assert_eq!(page_contents(&file.bytes), vec![PAGE_TEXT.to_vec(); 2]);
    }

    #[tokio::test]
    async fn test_password_protected_source_fails_to_load() {
        let mut editor = Editor::new(LopdfBackend, EditorConfig::default());

        let result = editor
            .load(SourceFile::new("private.pdf", build_encrypted_pdf(&[None], "secret")))
            .await;

        assert_eq!(result, Err(LoadFailure::PasswordRequired));
        assert_eq!(editor.state().phase(), SessionPhase::Errored);
    }

    #[tokio::test]
    async fn test_encrypted_source_rejected_when_not_ignored() {
        let config = EditorConfig::from_json_str(r#"{"load": {"ignoreEncryption": false}}"#).unwrap();
        let mut editor = Editor::new(
            FakeBackend {
                encrypted: true,
                ..Default::default()
            },
            config,
        );

        let result = editor.load(SourceFile::new("locked.pdf", fake_pdf(&[0]))).await;

        assert_eq!(result, Err(LoadFailure::Encrypted));
        assert_eq!(editor.state().phase(), SessionPhase::Errored);
    }

    #[tokio::test]
    async fn test_non_pdf_selection_fails_to_load() {
        let mut editor = fake_editor(FakeBackend::default());

        let result = editor
            .load(SourceFile::new("notes.txt", b"just text".to_vec()))
            .await;

        assert_eq!(
            result,
            Err(LoadFailure::NotPdf {
                name: "notes.txt".to_string(),
                detected: "text/plain".to_string(),
            })
        );
        assert_eq!(editor.state().phase(), SessionPhase::Errored);
        assert!(editor.state().ledger().is_none());
    }

    #[tokio::test]
    async fn test_document_without_pages() {
        let mut editor = fake_editor(FakeBackend::default());

        let result = editor.load(SourceFile::new("blank.pdf", fake_pdf(&[]))).await;

        assert_eq!(result, Err(LoadFailure::NoPages));
    }

    #[tokio::test]
    async fn test_late_parse_does_not_overwrite_newer_session() {
        let mut editor = fake_editor(FakeBackend::default());

        let slow = editor.select_file(SourceFile::new("first.pdf", fake_pdf(&[0; 6])));
        let fast = editor.select_file(SourceFile::new("second.pdf", fake_pdf(&[0, 0])));

        let fast_outcome = fast.parse().await;
        assert_eq!(
            editor.complete_load(fast_outcome),
            LoadStatus::Loaded(NonZeroUsize::new(2).unwrap())
        );
        editor.rotate_page(0).unwrap();

        let slow_outcome = slow.parse().await;
        assert_eq!(editor.complete_load(slow_outcome), LoadStatus::Superseded);

        let view = editor.view();
        assert_eq!(view.file_name.as_deref(), Some("second.pdf"));
        assert_eq!(ledger_degrees(&editor), vec![90, 0]);
    }

    #[tokio::test]
    async fn test_parse_timeout() {
        let config = EditorConfig::from_json_str(r#"{"load": {"timeoutSecs": 0}}"#).unwrap();
        let mut editor = Editor::new(
            FakeBackend {
                delay: Some(Duration::from_millis(200)),
                ..Default::default()
            },
            config,
        );

        let result = editor.load(SourceFile::new("slow.pdf", fake_pdf(&[0]))).await;

        assert_eq!(result, Err(LoadFailure::Timeout(Duration::ZERO)));
        assert_eq!(editor.state().phase(), SessionPhase::Errored);
    }

    #[tokio::test]
    async fn test_reupload_after_reset_starts_fresh() {
        let mut editor = fake_editor(FakeBackend::default());
        editor
            .load(SourceFile::new("a.pdf", fake_pdf(&[0, 0, 0])))
            .await
            .unwrap();
        editor.rotate_all().unwrap();
        editor.rotate_page(2).unwrap();

        editor.reset();
        assert_eq!(editor.state().phase(), SessionPhase::Empty);

        editor
            .load(SourceFile::new("b.pdf", fake_pdf(&[90, 0, 0, 0, 0])))
            .await
            .unwrap();
        assert_eq!(ledger_degrees(&editor), vec![0; 5]);
    }

    #[tokio::test]
    async fn test_export_failure_keeps_session_for_retry() {
        let mut editor = fake_editor(FakeBackend {
            fail_save: true,
            ..Default::default()
        });
        editor
            .load(SourceFile::new("a.pdf", fake_pdf(&[0, 0])))
            .await
            .unwrap();
        editor.rotate_page(1).unwrap();

        let result = editor.export().await;

        assert!(matches!(result, Err(ExportFailure::Document(_))));
        assert_eq!(editor.state().phase(), SessionPhase::Loaded);
        assert!(matches!(editor.state().error(), Some(SessionError::Export(_))));
        assert_eq!(ledger_degrees(&editor), vec![0, 90]);
    }

    #[tokio::test]
    async fn test_export_without_document() {
        let mut editor = fake_editor(FakeBackend::default());
        assert_eq!(editor.export().await, Err(ExportFailure::NoDocument));
        assert_eq!(editor.state().phase(), SessionPhase::Empty);
    }

    #[tokio::test]
    async fn test_export_to_directory_sink() {
        let temp_dir = TempDir::new().unwrap();
        let sink = crate::export::DirectorySink::new(temp_dir.path());
        let mut editor = fake_editor(FakeBackend::default());
        editor
            .load(SourceFile::new("a.pdf", fake_pdf(&[270, 0])))
            .await
            .unwrap();
        editor
            .rotate_page_towards(1, RotateDirection::CounterClockwise)
            .unwrap();
        editor.rotate_all().unwrap();

        editor.export_to(&sink).await.unwrap();

        let written = tokio::fs::read(temp_dir.path().join("rotated.pdf"))
            .await
            .unwrap();
        assert_eq!(fake_rotations(&written), vec![0, 0]);
        assert!(editor.state().error().is_none());
    }

    #[tokio::test]
    async fn test_rotation_before_load_is_rejected() {
        let mut editor = fake_editor(FakeBackend::default());
        let _pending = editor.select_file(SourceFile::new("a.pdf", fake_pdf(&[0])));

        assert_eq!(editor.rotate_page(0), Err(EditError::NoDocument));
        assert_eq!(editor.rotate_all(), Err(EditError::NoDocument));
    }
}
