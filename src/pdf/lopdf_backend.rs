//! PDF collaborator backed by lopdf
//!
//! Rotation is read through the page tree (a page without `/Rotate`
//! inherits it from its `/Pages` ancestors) and always written to the
//! page's own dictionary, which takes precedence over inherited values.
//!
//! Encrypted sources that open with an empty user password are decrypted
//! in memory on load. `save` encrypts a copy again with the source's
//! security handler, so the output keeps the original permissions and its
//! content streams stay readable.

use lopdf::{Document, EncryptionState, Object, ObjectId};

use crate::error::{DocumentError, LoadFailure};
use crate::rotation::Rotation;

use super::traits::{EditableDocument, LoadOptions, PdfBackend};

/// Guards against cyclic `/Parent` chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// [`PdfBackend`] implementation using lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

/// A document opened by [`LopdfBackend`]
pub struct LopdfDocument {
    inner: Document,
    /// Page object IDs in document order
    page_ids: Vec<ObjectId>,
    /// Security handler state of an encrypted source, reapplied on save
    encryption: Option<EncryptionState>,
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;

    fn load(&self, bytes: &[u8], options: &LoadOptions) -> Result<LopdfDocument, LoadFailure> {
        let inner = Document::load_mem(bytes).map_err(|e| LoadFailure::Malformed(e.to_string()))?;

        let encryption = if inner.is_encrypted() {
            if !options.ignore_encryption {
                return Err(LoadFailure::Encrypted);
            }
            // lopdf only decrypts when the empty user password authenticates
            let Some(state) = inner.encryption_state.clone() else {
                return Err(LoadFailure::PasswordRequired);
            };
            tracing::debug!("Document is encrypted, continuing with an empty user password");
            Some(state)
        } else {
            None
        };

        // get_pages is keyed by 1-based page number, so values come out in order
        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();

        Ok(LopdfDocument {
            inner,
            page_ids,
            encryption,
        })
    }
}

impl LopdfDocument {
    /// Whether the source carried an `/Encrypt` dictionary
    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_some()
    }

    /// Copy of the document with every object encrypted again under `state`
    fn reencrypted(&self, state: &EncryptionState) -> Result<Document, DocumentError> {
        let mut document = self.inner.clone();

        // The decrypted objects still sit under the source's /Encrypt entry,
        // which Document::encrypt refuses to overwrite
        if let Some(Ok(id)) = document
            .trailer
            .remove(b"Encrypt")
            .map(|object| object.as_reference())
        {
            document.objects.remove(&id);
        }

        document
            .encrypt(state)
            .map_err(|e| DocumentError::Serialize(format!("failed to re-encrypt document: {e}")))?;
        Ok(document)
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, DocumentError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(DocumentError::PageNotFound {
                index,
                page_count: self.page_ids.len(),
            })
    }

    /// Look up `key` on the page, then on each `/Pages` ancestor
    fn resolve_inherited(
        &self,
        index: usize,
        key: &[u8],
    ) -> Result<Option<&Object>, DocumentError> {
        let invalid = |message: String| DocumentError::InvalidPage { index, message };

        let mut current = self.page_id(index)?;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = self
                .inner
                .get_object(current)
                .and_then(Object::as_dict)
                .map_err(|e| invalid(format!("failed to get page dictionary: {e}")))?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value));
            }

            match dict.get(b"Parent") {
                Ok(parent) => {
                    current = parent
                        .as_reference()
                        .map_err(|e| invalid(format!("invalid /Parent reference: {e}")))?;
                }
                Err(_) => return Ok(None),
            }
        }

        Err(invalid("page tree is too deep or cyclic".to_string()))
    }

    /// Follow an indirect reference to its target object
    fn resolve_reference<'a>(
        &'a self,
        index: usize,
        object: &'a Object,
    ) -> Result<&'a Object, DocumentError> {
        match object {
            Object::Reference(id) => self.inner.get_object(*id).map_err(|e| {
                DocumentError::InvalidPage {
                    index,
                    message: format!("dangling /Rotate reference: {e}"),
                }
            }),
            other => Ok(other),
        }
    }
}

impl EditableDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn rotation(&self, index: usize) -> Result<Rotation, DocumentError> {
        let Some(object) = self.resolve_inherited(index, b"Rotate")? else {
            return Ok(Rotation::Deg0);
        };

        let value = match self.resolve_reference(index, object)? {
            Object::Integer(value) => *value,
            Object::Real(value) => value.round() as i64,
            other => {
                return Err(DocumentError::InvalidPage {
                    index,
                    message: format!("/Rotate is not a number: {other:?}"),
                })
            }
        };

        Ok(Rotation::from_pdf_value(value))
    }

    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<(), DocumentError> {
        let id = self.page_id(index)?;
        let dict = self
            .inner
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| DocumentError::InvalidPage {
                index,
                message: format!("failed to get page dictionary: {e}"),
            })?;

        dict.set("Rotate", i64::from(rotation));
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>, DocumentError> {
        let mut buffer = Vec::new();
        let result = match &self.encryption {
            Some(state) => self.reencrypted(state)?.save_to(&mut buffer),
            None => self.inner.save_to(&mut buffer),
        };
        result.map_err(|e| DocumentError::Serialize(e.to_string()))?;
        Ok(buffer)
    }
}
