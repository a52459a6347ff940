//! Fixtures shared by unit tests

use std::time::Duration;

use lopdf::{
    dictionary, Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions,
    Stream, StringFormat,
};

use crate::error::{DocumentError, LoadFailure};
use crate::pdf::{EditableDocument, LoadOptions, LopdfBackend, PdfBackend};
use crate::rotation::Rotation;

/// Content stream drawn on every page of [`build_encrypted_pdf`]
pub const PAGE_TEXT: &[u8] = b"BT /F1 24 Tf 72 720 Td (Hello encrypted world) Tj ET";

/// Build a PDF with one page per entry, setting `/Rotate` where given
pub fn build_pdf(rotations: &[Option<i64>]) -> Vec<u8> {
    save(build_page_tree(rotations, None, None))
}

/// Build a PDF whose pages inherit `/Rotate` from the `/Pages` node
pub fn build_pdf_with_inherited_rotation(pages: usize, rotation: i64) -> Vec<u8> {
    save(build_page_tree(&vec![None; pages], Some(rotation), None))
}

/// Build a PDF encrypted with RC4 128-bit (owner password "owner") that
/// only allows printing and copying. Every page draws [`PAGE_TEXT`].
pub fn build_encrypted_pdf(rotations: &[Option<i64>], user_password: &str) -> Vec<u8> {
    let mut doc = build_page_tree(rotations, None, Some(PAGE_TEXT));
    doc.trailer.set(
        "ID",
        vec![
            Object::String(b"pdf-rotate-test1".to_vec(), StringFormat::Literal),
            Object::String(b"pdf-rotate-test2".to_vec(), StringFormat::Literal),
        ],
    );

    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::PRINTABLE | Permissions::COPYABLE,
    })
    .expect("failed to derive encryption key");
    doc.encrypt(&state).expect("failed to encrypt test PDF");
    save(doc)
}

fn build_page_tree(
    rotations: &[Option<i64>],
    inherited: Option<i64>,
    content: Option<&[u8]>,
) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for rotation in rotations {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if let Some(rotation) = rotation {
            page.set("Rotate", *rotation);
        }
        if let Some(content) = content {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
            page.set("Contents", content_id);
        }
        kids.push(doc.add_object(page).into());
    }

    let mut pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => rotations.len() as i64,
    };
    if let Some(rotation) = inherited {
        pages.set("Rotate", rotation);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Decrypted content stream of every page
pub fn page_contents(bytes: &[u8]) -> Vec<Vec<u8>> {
    let doc = Document::load_mem(bytes).expect("failed to reload PDF");
    doc.get_pages()
        .into_values()
        .map(|id| doc.get_page_content(id).expect("page has no content"))
        .collect()
}

/// Permissions granted by the document's security handler, `None` when
/// the document is not encrypted
pub fn permissions_of(bytes: &[u8]) -> Option<Permissions> {
    let doc = Document::load_mem(bytes).expect("failed to reload PDF");
    if !doc.is_encrypted() {
        return None;
    }
    doc.encryption_state.as_ref().map(|state| state.permissions())
}

/// Effective rotation of every page, in degrees
pub fn rotations_of(bytes: &[u8]) -> Vec<u16> {
    let doc = LopdfBackend
        .load(bytes, &LoadOptions::default())
        .expect("failed to reload PDF");
    (0..doc.page_count())
        .map(|index| doc.rotation(index).unwrap().degrees())
        .collect()
}

/// Encode a document for [`FakeBackend`]: a PDF header followed by the
/// intrinsic rotation of each page as JSON.
pub fn fake_pdf(degrees: &[u16]) -> Vec<u8> {
    let mut bytes = b"%PDF-".to_vec();
    bytes.extend(serde_json::to_vec(degrees).unwrap());
    bytes
}

/// Decode bytes written by [`FakeDocument::save`]
pub fn fake_rotations(bytes: &[u8]) -> Vec<u16> {
    serde_json::from_slice(&bytes[5..]).unwrap()
}

/// In-memory backend used to exercise editor logic without real PDFs
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    /// Documents report themselves as encrypted
    pub encrypted: bool,
    /// `save` fails
    pub fail_save: bool,
    /// Parsing blocks for this long
    pub delay: Option<Duration>,
}

pub struct FakeDocument {
    pages: Vec<Rotation>,
    fail_save: bool,
}

impl PdfBackend for FakeBackend {
    type Document = FakeDocument;

    fn load(&self, bytes: &[u8], options: &LoadOptions) -> Result<FakeDocument, LoadFailure> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.encrypted && !options.ignore_encryption {
            return Err(LoadFailure::Encrypted);
        }

        let body = bytes
            .strip_prefix(b"%PDF-")
            .ok_or_else(|| LoadFailure::Malformed("missing header".to_string()))?;
        let pages: Vec<Rotation> =
            serde_json::from_slice(body).map_err(|e| LoadFailure::Malformed(e.to_string()))?;

        Ok(FakeDocument {
            pages,
            fail_save: self.fail_save,
        })
    }
}

impl EditableDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn rotation(&self, index: usize) -> Result<Rotation, DocumentError> {
        self.pages.get(index).copied().ok_or(DocumentError::PageNotFound {
            index,
            page_count: self.pages.len(),
        })
    }

    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<(), DocumentError> {
        let page_count = self.pages.len();
        let page = self
            .pages
            .get_mut(index)
            .ok_or(DocumentError::PageNotFound { index, page_count })?;
        *page = rotation;
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>, DocumentError> {
        if self.fail_save {
            return Err(DocumentError::Serialize("disk full".to_string()));
        }
        let mut bytes = b"%PDF-".to_vec();
        bytes.extend(serde_json::to_vec(&self.pages).unwrap());
        Ok(bytes)
    }
}
