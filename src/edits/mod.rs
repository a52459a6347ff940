//! Rotation edits
//!
//! The ledger records the rotation the user asked for on each page,
//! relative to whatever rotation the page already carries. The store is
//! the only place the ledger is mutated.

mod ledger;
mod store;

pub use ledger::RotationLedger;
pub use store::RotationEditStore;
