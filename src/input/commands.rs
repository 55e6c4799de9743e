//! Text commands for driving a session.
//!
//! Commands are one line each, vim-command style: a verb followed by
//! arguments. Case numbers are 1-based as shown to the user.
//!
//! # Example
//!
//! ```
//! use casequill::input::commands::{parse_command, Command};
//!
//! assert_eq!(parse_command("dup 2").unwrap(), Command::Duplicate(1));
//! assert_eq!(
//!     parse_command("set 1 mhm.age 25").unwrap(),
//!     Command::SetField { index: 0, path: "mhm.age".to_string(), value: "25".to_string() }
//! );
//! ```

use crate::document::template::section_descriptions;
use crate::engine::fields::FieldKind;
use crate::file::loader::read_input;
use crate::session::export::{copy_export, export_to_file, ClipboardSink, CopyOutcome};
use crate::session::{EditStatus, MessageLevel, Session};
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// A parsed command. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Show(usize),
    Add,
    Duplicate(usize),
    DuplicateBlank(usize),
    Delete(Vec<usize>),
    Clear,
    Edit { index: usize, text: String },
    Save(usize),
    Discard(usize),
    Fields(usize),
    SetField { index: usize, path: String, value: String },
    SaveFields(usize),
    Paste(String),
    Load(PathBuf),
    Status,
    Export(Option<PathBuf>),
    Copy(Option<usize>),
    Help,
    Quit,
}

/// Errors from parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    InvalidIndex(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "No command given"),
            CommandError::Unknown(verb) => {
                write!(f, "Unknown command: {} (try `help`)", verb)
            }
            CommandError::MissingArgument { command, argument } => {
                write!(f, "`{}` needs {}", command, argument)
            }
            CommandError::InvalidIndex(text) => {
                write!(f, "Not a test case number: {}", text)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Print(String),
    Quit,
}

const HELP: &str = "\
Commands (N is a test case number, starting at 1):
  list                  show every test case and its status
  show N                print the raw JSON of a test case
  add                   append a blank test case
  dup N / dupblank N    copy a test case, or a blank copy of it, after itself
  delete N [M...]       delete test cases
  clear                 delete all test cases
  edit N <json>         stage new raw JSON for a test case
  save N / discard N    save or drop the staged JSON (and field edits)
  fields N              show the fields of a test case by tab
  set N <path> <value>  stage a field value
  savefields N          save the staged field values
  paste <json>          replace all test cases with pasted JSON
  load <file>           replace all test cases with a file's contents
  status                count exportable test cases
  export [file]         write cleaned test cases to a file
  copy [N]              copy cleaned test cases to the clipboard
  quit                  leave the session";

fn parse_index(text: &str) -> Result<usize, CommandError> {
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::InvalidIndex(text.to_string())),
    }
}

/// Splits off the first whitespace-delimited word.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    }
}

fn required<'a>(
    text: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if text.trim().is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(text)
    }
}

/// Parses one command line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let (verb, rest) = split_word(line.trim());
    let index_arg = |command: &'static str| -> Result<usize, CommandError> {
        let (word, _) = split_word(required(rest, command, "a test case number")?);
        parse_index(word)
    };

    match verb {
        "" => Err(CommandError::Empty),
        "list" | "ls" => Ok(Command::List),
        "show" => Ok(Command::Show(index_arg("show")?)),
        "add" => Ok(Command::Add),
        "dup" => Ok(Command::Duplicate(index_arg("dup")?)),
        "dupblank" => Ok(Command::DuplicateBlank(index_arg("dupblank")?)),
        "delete" | "rm" => {
            let words = required(rest, "delete", "a test case number")?;
            let indices = words
                .split_whitespace()
                .map(parse_index)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Delete(indices))
        }
        "clear" => Ok(Command::Clear),
        "edit" => {
            let (word, text) = split_word(required(rest, "edit", "a test case number")?);
            let index = parse_index(word)?;
            let text = required(text, "edit", "JSON text")?;
            Ok(Command::Edit {
                index,
                text: text.to_string(),
            })
        }
        "save" => Ok(Command::Save(index_arg("save")?)),
        "discard" => Ok(Command::Discard(index_arg("discard")?)),
        "fields" => Ok(Command::Fields(index_arg("fields")?)),
        "set" => {
            let (word, rest) = split_word(required(rest, "set", "a test case number")?);
            let index = parse_index(word)?;
            let (path, value) = split_word(required(rest, "set", "a field path")?);
            Ok(Command::SetField {
                index,
                path: path.to_string(),
                value: value.to_string(),
            })
        }
        "savefields" => Ok(Command::SaveFields(index_arg("savefields")?)),
        "paste" => Ok(Command::Paste(required(rest, "paste", "JSON text")?.to_string())),
        "load" => Ok(Command::Load(PathBuf::from(
            required(rest, "load", "a file path")?.trim(),
        ))),
        "status" => Ok(Command::Status),
        "export" => Ok(Command::Export(
            (!rest.trim().is_empty()).then(|| PathBuf::from(rest.trim())),
        )),
        "copy" => {
            if rest.trim().is_empty() {
                Ok(Command::Copy(None))
            } else {
                Ok(Command::Copy(Some(index_arg("copy")?)))
            }
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Runs a command against the session.
///
/// Recoverable failures (bad JSON, unknown fields, out-of-range numbers)
/// come back as `Err` and also leave an error message on the session.
pub fn execute(
    command: &Command,
    session: &mut Session,
    clipboard: &mut dyn ClipboardSink,
) -> Result<Outcome> {
    match command {
        Command::List => Ok(Outcome::Print(render_list(session))),
        Command::Show(index) => Ok(Outcome::Print(session.editor_text(*index)?)),
        Command::Add => {
            session.add_blank();
            Ok(Outcome::Continue)
        }
        Command::Duplicate(index) => {
            session.duplicate(*index)?;
            Ok(Outcome::Continue)
        }
        Command::DuplicateBlank(index) => {
            session.duplicate_blank(*index)?;
            Ok(Outcome::Continue)
        }
        Command::Delete(indices) => {
            if let [index] = indices.as_slice() {
                session.delete(*index)?;
            } else {
                session.delete_many(indices)?;
            }
            Ok(Outcome::Continue)
        }
        Command::Clear => {
            session.clear_all();
            Ok(Outcome::Continue)
        }
        Command::Edit { index, text } => {
            session.stage_edit(*index, text)?;
            Ok(Outcome::Continue)
        }
        Command::Save(index) => {
            if session.has_pending_fields(*index) && !session.has_pending_edit(*index) {
                session.commit_fields(*index)?;
            } else {
                session.commit_edit(*index)?;
            }
            Ok(Outcome::Continue)
        }
        Command::Discard(index) => {
            let had_edit = session.discard_edit(*index)?;
            let had_fields = session.discard_fields(*index)?;
            let text = if had_edit || had_fields {
                format!("Discarded changes to Test Case {}", index + 1)
            } else {
                format!("Test Case {} has no unsaved changes", index + 1)
            };
            session.set_message(text, MessageLevel::Info);
            Ok(Outcome::Continue)
        }
        Command::Fields(index) => Ok(Outcome::Print(render_fields(session, *index)?)),
        Command::SetField { index, path, value } => {
            let value = session.set_field(*index, path, value)?;
            Ok(Outcome::Print(format!("{} = {}", path, value)))
        }
        Command::SaveFields(index) => {
            session.commit_fields(*index)?;
            Ok(Outcome::Continue)
        }
        Command::Paste(text) => {
            session.load_text(text)?;
            Ok(Outcome::Continue)
        }
        Command::Load(path) => {
            let text = read_input(path)?;
            session.load_text(&text)?;
            Ok(Outcome::Continue)
        }
        Command::Status => Ok(Outcome::Print(format!(
            "{} test case(s), {} ready to export",
            session.len(),
            session.exportable_count()
        ))),
        Command::Export(path) => {
            export_to_file(session, path.as_deref())?;
            Ok(Outcome::Continue)
        }
        Command::Copy(index) => match copy_export(session, *index, clipboard)? {
            CopyOutcome::Copied { .. } => Ok(Outcome::Continue),
            CopyOutcome::Fallback { payload, .. } => Ok(Outcome::Print(payload)),
        },
        Command::Help => Ok(Outcome::Print(HELP.to_string())),
        Command::Quit => Ok(Outcome::Quit),
    }
}

/// One line per case with its export and edit status.
pub fn render_list(session: &Session) -> String {
    if session.is_empty() {
        return "No test cases loaded. Use `add` or `paste <json>` to start.".to_string();
    }

    let mut lines = Vec::new();
    for status in session.validation_report() {
        let mut line = format!(
            "Test Case {}: {}",
            status.index + 1,
            if status.blank { "empty" } else { "ready" }
        );
        match status.pending_edit {
            Some(EditStatus::Valid) => line.push_str(", unsaved JSON (valid)"),
            Some(EditStatus::Invalid(_)) => line.push_str(", unsaved JSON (invalid)"),
            None => {}
        }
        if status.pending_fields {
            line.push_str(", unsaved fields");
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Fields of one case grouped by tab, one field per line.
pub fn render_fields(session: &Session, index: usize) -> Result<String> {
    let tabs = session.field_view(index)?;
    let mut out = String::new();
    for tab in tabs {
        let description = section_descriptions()
            .iter()
            .find(|(key, _)| *key == tab.name)
            .map(|(_, text)| format!(" - {}", text))
            .unwrap_or_default();
        out.push_str(&format!("[{}]{}\n", tab.name, description));
        for field in tab.fields {
            let shown = match field.kind {
                FieldKind::Text => format!("{:?}", field.value.to_string()),
                _ => field.value.to_string(),
            };
            out.push_str(&format!("  {} ({}) = {}\n", field.label, field.kind, shown));
        }
    }
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("list"), Ok(Command::List));
        assert_eq!(parse_command("  add  "), Ok(Command::Add));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("copy"), Ok(Command::Copy(None)));
        assert_eq!(parse_command("copy 3"), Ok(Command::Copy(Some(2))));
        assert_eq!(parse_command("export"), Ok(Command::Export(None)));
    }

    #[test]
    fn test_parse_edit_keeps_json_text() {
        assert_eq!(
            parse_command(r#"edit 1 {"a": [1, 2]}"#),
            Ok(Command::Edit {
                index: 0,
                text: r#"{"a": [1, 2]}"#.to_string()
            })
        );
    }

    #[test]
    fn test_parse_set_value_with_spaces() {
        assert_eq!(
            parse_command("set 2 mhm.note two words"),
            Ok(Command::SetField {
                index: 1,
                path: "mhm.note".to_string(),
                value: "two words".to_string()
            })
        );
        assert_eq!(
            parse_command("set 2 mhm.age"),
            Ok(Command::SetField {
                index: 1,
                path: "mhm.age".to_string(),
                value: String::new()
            })
        );
    }

    #[test]
    fn test_parse_delete_many() {
        assert_eq!(parse_command("delete 1 3 2"), Ok(Command::Delete(vec![0, 2, 1])));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command(""), Err(CommandError::Empty));
        assert_eq!(
            parse_command("frobnicate"),
            Err(CommandError::Unknown("frobnicate".to_string()))
        );
        assert_eq!(
            parse_command("show 0"),
            Err(CommandError::InvalidIndex("0".to_string()))
        );
        assert_eq!(
            parse_command("show"),
            Err(CommandError::MissingArgument {
                command: "show",
                argument: "a test case number"
            })
        );
        assert!(matches!(
            parse_command("edit 1"),
            Err(CommandError::MissingArgument { argument: "JSON text", .. })
        ));
    }
}
