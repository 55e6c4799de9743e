//! casequill - edit, blank and clean JSON test cases for a health-score API.
//!
//! The crate is organised around the canonicalization engine in [`engine`]:
//! blanking a case into a template, stripping empty values, deciding whether
//! a case is empty, and flattening a case into editable fields. The
//! [`session`] module holds a set of cases under edit and produces the
//! export payload; [`input`] drives a session from text commands.

pub mod config;
pub mod document;
pub mod engine;
pub mod file;
pub mod input;
pub mod session;
