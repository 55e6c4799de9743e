//! Command input for interactive sessions.
//!
//! This module parses one-line text commands and applies them to a
//! `Session`.

pub mod commands;

pub use commands::{execute, parse_command, Command, CommandError, Outcome};
