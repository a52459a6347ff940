//! Download sinks
//!
//! A sink receives the finished export. In a browser this is the download
//! prompt; [`DirectorySink`] saves into a local directory instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::DEFAULT_EXPORT_FILE_NAME;
use crate::error::{ExportFailure, ExportResult};
use crate::pdf::PDF_CONTENT_TYPE;

/// A complete exported document ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: PDF_CONTENT_TYPE,
            bytes,
        }
    }

    /// Export named with the default file name
    pub fn with_default_name(bytes: Vec<u8>) -> Self {
        Self::new(DEFAULT_EXPORT_FILE_NAME, bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Receives exported files
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, file: &ExportedFile) -> ExportResult<()>;
}

/// Saves exports into a directory
///
/// The file is written under a temporary name and renamed into place, so
/// a reader never observes a partially written document.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final location of an export
    pub fn path_for(&self, file: &ExportedFile) -> ExportResult<PathBuf> {
        // Only the final component is used, so names cannot escape the directory
        let name = Path::new(&file.file_name)
            .file_name()
            .ok_or_else(|| ExportFailure::Delivery(format!("Invalid file name: {:?}", file.file_name)))?;
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, file: &ExportedFile) -> ExportResult<()> {
        let path = self.path_for(file)?;
        let partial = path.with_extension("part");
        let io_err = |e: std::io::Error| ExportFailure::Delivery(e.to_string());

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        tokio::fs::write(&partial, &file.bytes).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(io_err(e));
        }

        tracing::info!(
            path = %path.display(),
            size = file.bytes.len(),
            "Saved exported document"
        );
        Ok(())
    }
}
