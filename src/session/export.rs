//! Delivering the export payload: file download and clipboard copy.

use super::state::{MessageLevel, Session, SessionError};
use crate::file::saver::save_export;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Destination for clipboard copies.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> std::result::Result<(), String>;
}

/// The system clipboard.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> std::result::Result<(), String> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
            .map_err(|e| e.to_string())
    }
}

/// Result of a clipboard copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The payload is on the clipboard.
    Copied { cases: usize },
    /// The clipboard could not be used; the payload is returned so the
    /// caller can show it for manual copying.
    Fallback { payload: String, reason: String },
}

/// Summary of a file export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub cases: usize,
}

/// Writes the cleaned, non-blank cases to `path`, or to the configured
/// export file name when `path` is `None`.
pub fn export_to_file(session: &mut Session, path: Option<&Path>) -> Result<ExportSummary> {
    let Some(payload) = session.export_payload() else {
        session.set_message(
            SessionError::NothingToExport.to_string(),
            MessageLevel::Warning,
        );
        return Err(SessionError::NothingToExport.into());
    };

    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&session.config().export_filename));
    save_export(&path, &payload, session.config().create_backup)?;

    let cases = session.exportable_count();
    session.set_message(
        format!("Exported {} test case(s) to {}", cases, path.display()),
        MessageLevel::Info,
    );
    Ok(ExportSummary { path, cases })
}

/// Copies the export payload to the clipboard.
///
/// With `index` set, only that case is copied (as a one-element array).
/// When the clipboard is disabled in the config or unavailable, the payload
/// comes back as [`CopyOutcome::Fallback`].
pub fn copy_export(
    session: &mut Session,
    index: Option<usize>,
    clipboard: &mut dyn ClipboardSink,
) -> std::result::Result<CopyOutcome, SessionError> {
    let (payload, cases) = match index {
        Some(index) => match session.export_one(index)? {
            Some(payload) => (payload, 1),
            None => {
                session.set_message(
                    format!("Test Case {} is empty!", index + 1),
                    MessageLevel::Warning,
                );
                return Err(SessionError::NothingToExport);
            }
        },
        None => match session.export_payload() {
            Some(payload) => (payload, session.exportable_count()),
            None => {
                session.set_message(
                    SessionError::NothingToExport.to_string(),
                    MessageLevel::Warning,
                );
                return Err(SessionError::NothingToExport);
            }
        },
    };

    if !session.config().sync_clipboard {
        session.set_message(
            "Clipboard sync is disabled; copy the JSON below manually".to_string(),
            MessageLevel::Warning,
        );
        return Ok(CopyOutcome::Fallback {
            payload,
            reason: "clipboard sync is disabled".to_string(),
        });
    }

    match clipboard.set_text(&payload) {
        Ok(()) => {
            session.set_message(
                format!("Copied {} test case(s) to clipboard", cases),
                MessageLevel::Info,
            );
            Ok(CopyOutcome::Copied { cases })
        }
        Err(reason) => {
            tracing::warn!("Clipboard copy failed: {}", reason);
            session.set_message(
                "Copy failed. Please copy the JSON below manually".to_string(),
                MessageLevel::Warning,
            );
            Ok(CopyOutcome::Fallback { payload, reason })
        }
    }
}
