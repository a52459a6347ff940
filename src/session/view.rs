//! Display projection of the session
//!
//! What the thumbnail grid needs to draw: one entry per page with the
//! rotation to apply to its rendered thumbnail.

use serde::Serialize;

use crate::rotation::Rotation;

use super::state::{SessionPhase, SessionState};

/// One page thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// 0-based position in the document
    pub index: usize,
    /// 1-based page number for labels
    pub page_number: usize,
    /// Rotation delta to apply when displaying the rendered page
    pub display_rotation: Rotation,
}

/// Snapshot of the session for the display layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    pub pages: Vec<PageView>,
    /// Whether any page has a pending rotation
    pub modified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        let pages = state
            .ledger()
            .map(|ledger| {
                ledger
                    .iter()
                    .map(|(index, rotation)| PageView {
                        index,
                        page_number: index + 1,
                        display_rotation: rotation,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            phase: state.phase(),
            file_name: state.document().map(|d| d.source.name().to_string()),
            page_count: state.edits().page_count(),
            pages,
            modified: state.ledger().is_some_and(|l| l.is_modified()),
            error: state.error().map(|e| e.to_string()),
        }
    }
}

impl SessionView {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
