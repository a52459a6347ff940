//! Document session
//!
//! One loaded document and its rotation edits, for the lifetime of an
//! editing session.
//!
//! ```text
//!            SelectFile             LoadSucceeded
//!   Empty ──────────────► Empty ─────────────────► Loaded
//!     ▲     (parse pending)  │                       │
//!     │                      │ LoadFailed            │ Reset
//!     │        Reset         ▼                       ▼
//!     └──────────────── Errored                    Empty
//! ```
//!
//! [`SessionState`] is a plain value advanced by [`SessionState::reduce`].
//! [`Editor`] owns one and drives the two asynchronous steps, parsing and
//! export, against a [`crate::pdf::PdfBackend`].

mod editor;
mod state;
mod view;

pub use editor::{Editor, LoadOutcome, LoadStatus, PendingLoad};
pub use state::{Action, DocumentSession, SessionError, SessionPhase, SessionState};
pub use view::{PageView, SessionView};
