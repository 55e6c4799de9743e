//! File I/O for test case sets.
//!
//! This module loads test cases from disk or stdin and writes export
//! payloads back with atomic writes and optional backups.

pub mod loader;
pub mod saver;
