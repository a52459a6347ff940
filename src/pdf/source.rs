//! Source file selected by the user

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::LoadFailure;

/// MIME type of PDF input and output
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Readers accept the header anywhere in the first 1024 bytes
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Immutable bytes of the uploaded file plus its name
///
/// Cloning is cheap: the content is shared.
#[derive(Clone)]
pub struct SourceFile {
    name: String,
    bytes: Arc<[u8]>,
    fingerprint: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            fingerprint: compute_fingerprint(&bytes),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the content for worker threads
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// SHA-256 of the content, hex encoded
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Check that the content looks like a PDF before handing it to a parser
    pub fn sniff(&self) -> Result<(), LoadFailure> {
        if self.bytes.is_empty() {
            return Err(LoadFailure::Empty);
        }

        let window = &self.bytes[..self.bytes.len().min(HEADER_SEARCH_WINDOW)];
        if window.windows(5).any(|w| w == b"%PDF-") {
            return Ok(());
        }

        let detected = mime_guess::from_path(&self.name)
            .first_raw()
            .unwrap_or("application/octet-stream");
        Err(LoadFailure::NotPdf {
            name: self.name.clone(),
            detected: detected.to_string(),
        })
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.bytes == other.bytes
    }
}

impl Eq for SourceFile {}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

fn compute_fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
