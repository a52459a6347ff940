//! Rotation Edit Store
//!
//! Owns the rotation ledger and exposes the only legal mutations on it.
//! The ledger exists only once the document's page count is known.

use std::num::NonZeroUsize;

use crate::error::EditError;
use crate::rotation::{RotateDirection, Rotation};

use super::ledger::RotationLedger;

/// Holder of the rotation ledger for the loaded document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationEditStore {
    ledger: Option<RotationLedger>,
}

impl RotationEditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an all-zero ledger of `page_count` entries.
    ///
    /// Replaces any existing ledger, so deltas from a previous document
    /// never carry over.
    pub fn initialize(&mut self, page_count: NonZeroUsize) {
        self.ledger = Some(RotationLedger::new(page_count));
        tracing::debug!(page_count = page_count.get(), "Initialized rotation ledger");
    }

    /// Rotate one page a quarter-turn clockwise
    pub fn rotate_page(&mut self, index: usize) -> Result<Rotation, EditError> {
        self.rotate_page_towards(index, RotateDirection::Clockwise)
    }

    /// Rotate one page a quarter-turn in `direction`
    pub fn rotate_page_towards(
        &mut self,
        index: usize,
        direction: RotateDirection,
    ) -> Result<Rotation, EditError> {
        let ledger = self.ledger.as_mut().ok_or(EditError::NoDocument)?;
        match ledger.step_page(index, direction) {
            Ok(rotation) => {
                tracing::debug!(index, rotation = rotation.degrees(), "Rotated page");
                Ok(rotation)
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Rejected page rotation");
                Err(e)
            }
        }
    }

    /// Advance every page's delta by one quarter-turn clockwise
    pub fn rotate_all(&mut self) -> Result<(), EditError> {
        self.rotate_all_towards(RotateDirection::Clockwise)
    }

    /// Advance every page's delta by one quarter-turn in `direction`
    pub fn rotate_all_towards(&mut self, direction: RotateDirection) -> Result<(), EditError> {
        let ledger = self.ledger.as_mut().ok_or(EditError::NoDocument)?;
        ledger.step_all(direction);
        tracing::debug!(pages = ledger.len(), ?direction, "Rotated all pages");
        Ok(())
    }

    /// Zero every delta while keeping the ledger
    pub fn revert(&mut self) -> Result<(), EditError> {
        let ledger = self.ledger.as_mut().ok_or(EditError::NoDocument)?;
        ledger.clear_deltas();
        Ok(())
    }

    /// Drop the ledger entirely
    pub fn reset(&mut self) {
        self.ledger = None;
    }

    pub fn ledger(&self) -> Option<&RotationLedger> {
        self.ledger.as_ref()
    }

    /// Copy of the ledger for readers such as the export pass
    pub fn snapshot(&self) -> Option<RotationLedger> {
        self.ledger.clone()
    }

    pub fn page_count(&self) -> Option<usize> {
        self.ledger.as_ref().map(RotationLedger::len)
    }

    pub fn is_initialized(&self) -> bool {
        self.ledger.is_some()
    }
}
