//! Per-page rotation deltas

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::error::EditError;
use crate::rotation::{RotateDirection, Rotation};

/// Rotation deltas indexed by page position
///
/// Entries are relative to the page's intrinsic rotation. The ledger is
/// keyed by position only, so it stays valid as long as page order never
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RotationLedger {
    entries: Vec<Rotation>,
}

impl RotationLedger {
    /// Create an all-zero ledger for `page_count` pages
    pub fn new(page_count: NonZeroUsize) -> Self {
        Self {
            entries: vec![Rotation::Deg0; page_count.get()],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delta for a page, `None` when out of range
    pub fn get(&self, index: usize) -> Option<Rotation> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[Rotation] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Rotation)> + '_ {
        self.entries.iter().copied().enumerate()
    }

    /// Whether any page carries a non-zero delta
    pub fn is_modified(&self) -> bool {
        self.entries.iter().any(|r| !r.is_identity())
    }

    /// Indices of pages with a non-zero delta
    pub fn modified_pages(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, r)| !r.is_identity())
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn step_page(
        &mut self,
        index: usize,
        direction: RotateDirection,
    ) -> Result<Rotation, EditError> {
        let page_count = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(EditError::PageOutOfRange { index, page_count })?;
        *entry = entry.step(direction);
        Ok(*entry)
    }

    /// Each entry advances independently, so offsets between pages hold.
    pub(crate) fn step_all(&mut self, direction: RotateDirection) {
        for entry in &mut self.entries {
            *entry = entry.step(direction);
        }
    }

    pub(crate) fn clear_deltas(&mut self) {
        self.entries.fill(Rotation::Deg0);
    }
}
