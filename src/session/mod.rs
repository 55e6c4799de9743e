//! Editing sessions over a set of test cases.
//!
//! # Modules
//!
//! - `state`: the `Session` controller holding cases, staged edits and messages
//! - `export`: writing the cleaned payload to a file or the clipboard

pub mod export;
pub mod state;

pub use state::{CaseStatus, EditStatus, Message, MessageLevel, Session, SessionError};
