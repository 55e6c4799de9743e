//! Session state for an editing session over a set of test cases.
//!
//! A `Session` owns the ordered test cases, the raw-text edits and field
//! edits that have been staged but not saved, and the last user-facing
//! message. Every mutation goes through a method on `Session`, and the
//! derived views (validation report, export payload) are recomputed from
//! scratch each time they are asked for. That cost is linear in the number
//! of cases times their size, which is fine for hand-edited test sets.
//!
//! Positions are 0-based in this API. Messages use the 1-based "Test Case N"
//! numbering that users see.

use crate::config::Config;
use crate::document::node::CaseValue;
use crate::document::parser::{
    parse_document, parse_documents, to_pretty_json, to_pretty_json_array, ParseError,
};
use crate::document::template::default_template;
use crate::engine::fields::{flatten, group_by_tab, unflatten, FieldError, FieldTab};
use crate::engine::{blank, clean, is_blank, FieldValue, FlatFields};
use std::collections::BTreeMap;
use std::fmt;

/// A message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
}

/// Message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Validation state of a staged raw-text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStatus {
    Valid,
    Invalid(String),
}

/// Per-case line of the validation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStatus {
    pub index: usize,
    /// The committed case has no content after cleaning
    pub blank: bool,
    /// Status of a staged raw-text edit, if any
    pub pending_edit: Option<EditStatus>,
    /// Field edits are staged but not saved
    pub pending_fields: bool,
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    IndexOutOfRange { index: usize, len: usize },
    NoPendingEdit { index: usize },
    Parse(ParseError),
    Field { index: usize, error: FieldError },
    /// Refused to remove the only remaining case.
    LastCase,
    NothingToExport,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::IndexOutOfRange { index, len } => write!(
                f,
                "Test Case {} does not exist ({} case(s) loaded)",
                index + 1,
                len
            ),
            SessionError::NoPendingEdit { index } => {
                write!(f, "Test Case {} has no unsaved edit", index + 1)
            }
            SessionError::Parse(err) => write!(f, "{}", err),
            SessionError::Field { index, error } => {
                write!(f, "Test Case {}: {}", index + 1, error)
            }
            SessionError::LastCase => write!(f, "Cannot delete the last test case!"),
            SessionError::NothingToExport => write!(f, "No non-empty test cases to export"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ParseError> for SessionError {
    fn from(err: ParseError) -> Self {
        SessionError::Parse(err)
    }
}

/// In-memory editing session over an ordered set of test cases.
#[derive(Debug, Clone)]
pub struct Session {
    documents: Vec<CaseValue>,
    pending_edits: BTreeMap<usize, String>,
    field_edits: BTreeMap<usize, FlatFields>,
    template: CaseValue,
    config: Config,
    message: Option<Message>,
    /// The only case was put there by `ensure_one_case` and never touched
    seeded: bool,
}

impl Session {
    /// Creates a session with no cases (or one blank case when the config
    /// asks to keep at least one).
    pub fn new(config: Config) -> Self {
        Self::with_documents(Vec::new(), config)
    }

    /// Creates a session holding the given cases.
    pub fn with_documents(documents: Vec<CaseValue>, config: Config) -> Self {
        let mut session = Self {
            documents,
            pending_edits: BTreeMap::new(),
            field_edits: BTreeMap::new(),
            template: default_template(),
            config,
            message: None,
            seeded: false,
        };
        session.ensure_one_case();
        session
    }

    /// Replaces the template used to seed blank cases.
    ///
    /// A case seeded from the previous template is re-seeded from this one.
    pub fn with_template(mut self, template: CaseValue) -> Self {
        self.template = template;
        if self.seeded && self.pending_edits.is_empty() && self.field_edits.is_empty() {
            self.documents = vec![blank(&self.template)];
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn template(&self) -> &CaseValue {
        &self.template
    }

    pub fn documents(&self) -> &[CaseValue] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the committed case at `index`.
    pub fn document(&self, index: usize) -> Result<&CaseValue, SessionError> {
        self.documents.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            len: self.documents.len(),
        })
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        self.document(index).map(|_| ())
    }

    fn ensure_one_case(&mut self) {
        self.seeded = self.config.keep_one_case && self.documents.is_empty();
        if self.seeded {
            self.documents.push(blank(&self.template));
        }
    }

    // Messages

    /// Returns the current message, if any.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Sets a message to display to the user.
    pub fn set_message(&mut self, text: String, level: MessageLevel) {
        self.message = Some(Message { text, level });
    }

    /// Clears the current message.
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    // Loading

    /// Parses `text` and replaces the whole set with its cases.
    ///
    /// On a parse error the set, its staged edits and the message stay
    /// usable: only the message changes to report the error.
    pub fn load_text(&mut self, text: &str) -> Result<usize, SessionError> {
        match parse_documents(text) {
            Ok(documents) => Ok(self.load_documents(documents)),
            Err(err) => {
                tracing::warn!("Rejected input: {}", err);
                self.set_message(err.to_string(), MessageLevel::Error);
                Err(err.into())
            }
        }
    }

    /// Replaces the whole set with already-parsed cases.
    pub fn load_documents(&mut self, documents: Vec<CaseValue>) -> usize {
        self.documents = documents;
        self.pending_edits.clear();
        self.field_edits.clear();
        self.ensure_one_case();
        let count = self.documents.len();
        tracing::debug!("Loaded {} case(s)", count);
        self.set_message(format!("Loaded {} test case(s)", count), MessageLevel::Info);
        count
    }

    // Set management

    /// Appends a blank copy of the template and returns its index.
    pub fn add_blank(&mut self) -> usize {
        self.seeded = false;
        self.documents.push(blank(&self.template));
        let index = self.documents.len() - 1;
        tracing::debug!("Added blank case at {}", index);
        self.set_message(format!("Added Test Case {}", index + 1), MessageLevel::Info);
        index
    }

    /// Inserts a copy of case `index` right after it.
    pub fn duplicate(&mut self, index: usize) -> Result<usize, SessionError> {
        let copy = self.document(index)?.clone();
        Ok(self.insert_after(index, copy, "Duplicated"))
    }

    /// Inserts a blank copy of case `index` right after it.
    pub fn duplicate_blank(&mut self, index: usize) -> Result<usize, SessionError> {
        let copy = blank(self.document(index)?);
        Ok(self.insert_after(index, copy, "Blank-duplicated"))
    }

    fn insert_after(&mut self, index: usize, document: CaseValue, verb: &str) -> usize {
        let at = index + 1;
        self.seeded = false;
        self.documents.insert(at, document);
        rekey(&mut self.pending_edits, |k| Some(if k >= at { k + 1 } else { k }));
        rekey(&mut self.field_edits, |k| Some(if k >= at { k + 1 } else { k }));
        tracing::debug!("{} case {} into {}", verb, index, at);
        self.set_message(
            format!("{} Test Case {} as Test Case {}", verb, index + 1, at + 1),
            MessageLevel::Info,
        );
        at
    }

    /// Removes case `index`, dropping its staged edits and shifting the
    /// staged edits of later cases down by one.
    pub fn delete(&mut self, index: usize) -> Result<CaseValue, SessionError> {
        self.check_index(index)?;
        if self.config.keep_one_case && self.documents.len() == 1 {
            self.set_message(SessionError::LastCase.to_string(), MessageLevel::Warning);
            return Err(SessionError::LastCase);
        }
        let removed = self.remove_at(index);
        self.set_message(format!("Deleted Test Case {}", index + 1), MessageLevel::Info);
        Ok(removed)
    }

    /// Removes several cases at once.
    ///
    /// All indices are checked before anything is removed, and removal runs
    /// from the highest index down so earlier removals never shift later
    /// targets. Duplicates are ignored. Returns the number removed.
    pub fn delete_many(&mut self, indices: &[usize]) -> Result<usize, SessionError> {
        let mut targets = indices.to_vec();
        targets.sort_unstable_by(|a, b| b.cmp(a));
        targets.dedup();

        for &index in &targets {
            self.check_index(index)?;
        }
        if self.config.keep_one_case && targets.len() >= self.documents.len() {
            self.set_message(SessionError::LastCase.to_string(), MessageLevel::Warning);
            return Err(SessionError::LastCase);
        }

        for &index in &targets {
            self.remove_at(index);
        }
        self.set_message(
            format!("Deleted {} test case(s)", targets.len()),
            MessageLevel::Info,
        );
        Ok(targets.len())
    }

    fn remove_at(&mut self, index: usize) -> CaseValue {
        self.seeded = false;
        let removed = self.documents.remove(index);
        let shift = |k: usize| match k.cmp(&index) {
            std::cmp::Ordering::Less => Some(k),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(k - 1),
        };
        rekey(&mut self.pending_edits, shift);
        rekey(&mut self.field_edits, shift);
        tracing::debug!("Removed case {}", index);
        removed
    }

    /// Removes every case and every staged edit.
    pub fn clear_all(&mut self) {
        self.documents.clear();
        self.pending_edits.clear();
        self.field_edits.clear();
        self.ensure_one_case();
        tracing::debug!("Cleared all cases");
        self.set_message("Cleared all test cases".to_string(), MessageLevel::Info);
    }

    // Raw text editing

    /// Returns the text to show in the raw editor for case `index`: the
    /// staged edit if there is one, otherwise the pretty-printed case.
    pub fn editor_text(&self, index: usize) -> Result<String, SessionError> {
        let document = self.document(index)?;
        Ok(match self.pending_edits.get(&index) {
            Some(text) => text.clone(),
            None => to_pretty_json(document, self.config.indent_size),
        })
    }

    /// Stages raw text for case `index` and validates it.
    ///
    /// The committed case is never touched here, valid or not.
    pub fn stage_edit(&mut self, index: usize, text: &str) -> Result<EditStatus, SessionError> {
        self.check_index(index)?;
        self.pending_edits.insert(index, text.to_string());
        let status = validate(text);
        match &status {
            EditStatus::Valid => self.set_message("Valid JSON".to_string(), MessageLevel::Info),
            EditStatus::Invalid(reason) => self.set_message(reason.clone(), MessageLevel::Error),
        }
        Ok(status)
    }

    /// Validation state of the staged edit for case `index`, if any.
    pub fn edit_status(&self, index: usize) -> Option<EditStatus> {
        self.pending_edits.get(&index).map(|text| validate(text))
    }

    pub fn has_pending_edit(&self, index: usize) -> bool {
        self.pending_edits.contains_key(&index)
    }

    /// Parses the staged edit for case `index` and makes it the committed case.
    ///
    /// Invalid text is kept staged and the committed case is unchanged.
    /// A successful save discards any staged field edits for the case.
    pub fn commit_edit(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_index(index)?;
        let text = self
            .pending_edits
            .get(&index)
            .ok_or(SessionError::NoPendingEdit { index })?;

        match parse_document(text) {
            Ok(document) => {
                self.seeded = false;
                self.documents[index] = document;
                self.pending_edits.remove(&index);
                self.field_edits.remove(&index);
                tracing::debug!("Committed raw edit for case {}", index);
                self.set_message(format!("Saved Test Case {}", index + 1), MessageLevel::Info);
                Ok(())
            }
            Err(err) => {
                self.set_message(err.to_string(), MessageLevel::Error);
                Err(err.into())
            }
        }
    }

    /// Drops the staged edit for case `index`. Returns whether one existed.
    pub fn discard_edit(&mut self, index: usize) -> Result<bool, SessionError> {
        self.check_index(index)?;
        Ok(self.pending_edits.remove(&index).is_some())
    }

    // Field editing

    /// Returns the field map for case `index`, including staged field edits.
    pub fn field_values(&self, index: usize) -> Result<FlatFields, SessionError> {
        let document = self.document(index)?;
        if let Some(fields) = self.field_edits.get(&index) {
            return Ok(fields.clone());
        }
        flatten(document, &self.config.field_separator)
            .map_err(|error| SessionError::Field { index, error })
    }

    /// Returns the fields of case `index` grouped into tabs.
    pub fn field_view(&self, index: usize) -> Result<Vec<FieldTab>, SessionError> {
        let fields = self.field_values(index)?;
        Ok(group_by_tab(&fields, &self.config.field_separator))
    }

    pub fn has_pending_fields(&self, index: usize) -> bool {
        self.field_edits.contains_key(&index)
    }

    /// Stages a new value for one field of case `index`.
    ///
    /// `input` is interpreted according to the field's current control, so
    /// a number field rejects text and a checkbox takes true/false.
    pub fn set_field(
        &mut self,
        index: usize,
        path: &str,
        input: &str,
    ) -> Result<FieldValue, SessionError> {
        let mut fields = self.field_values(index)?;
        let field_error = |error| SessionError::Field { index, error };

        let current = fields.get(path).ok_or_else(|| {
            field_error(FieldError::UnknownField {
                path: path.to_string(),
            })
        })?;
        let value = current.parse_input(input).map_err(|error| match error {
            FieldError::ReadOnly { .. } => field_error(FieldError::ReadOnly {
                path: path.to_string(),
            }),
            other => field_error(other),
        });
        let value = match value {
            Ok(value) => value,
            Err(err) => {
                self.set_message(err.to_string(), MessageLevel::Error);
                return Err(err);
            }
        };

        fields.insert(path.to_string(), value.clone());
        self.field_edits.insert(index, fields);
        Ok(value)
    }

    /// Rebuilds case `index` from its staged field edits and commits it.
    ///
    /// Returns `Ok(false)` when there was nothing staged. A successful save
    /// discards any staged raw-text edit for the case.
    pub fn commit_fields(&mut self, index: usize) -> Result<bool, SessionError> {
        self.check_index(index)?;
        let Some(fields) = self.field_edits.get(&index) else {
            self.set_message(
                format!("Test Case {} has no field changes", index + 1),
                MessageLevel::Info,
            );
            return Ok(false);
        };

        match unflatten(fields, &self.config.field_separator) {
            Ok(document) => {
                self.seeded = false;
                self.documents[index] = document;
                self.field_edits.remove(&index);
                self.pending_edits.remove(&index);
                tracing::debug!("Committed field edits for case {}", index);
                self.set_message(format!("Saved Test Case {}", index + 1), MessageLevel::Info);
                Ok(true)
            }
            Err(error) => {
                let err = SessionError::Field { index, error };
                self.set_message(err.to_string(), MessageLevel::Error);
                Err(err)
            }
        }
    }

    /// Drops staged field edits for case `index`. Returns whether any existed.
    pub fn discard_fields(&mut self, index: usize) -> Result<bool, SessionError> {
        self.check_index(index)?;
        Ok(self.field_edits.remove(&index).is_some())
    }

    // Derived views

    /// Recomputes the status of every case.
    pub fn validation_report(&self) -> Vec<CaseStatus> {
        self.documents
            .iter()
            .enumerate()
            .map(|(index, document)| CaseStatus {
                index,
                blank: is_blank(document),
                pending_edit: self.edit_status(index),
                pending_fields: self.has_pending_fields(index),
            })
            .collect()
    }

    /// The cleaned form of every case that is not blank, in order.
    pub fn exportable(&self) -> Vec<CaseValue> {
        self.documents
            .iter()
            .filter(|document| !is_blank(document))
            .map(clean)
            .collect()
    }

    pub fn exportable_count(&self) -> usize {
        self.documents.iter().filter(|d| !is_blank(d)).count()
    }

    /// Pretty-printed JSON array of every non-blank case, cleaned.
    ///
    /// Returns `None` when every case is blank.
    pub fn export_payload(&self) -> Option<String> {
        let cases = self.exportable();
        if cases.is_empty() {
            return None;
        }
        Some(to_pretty_json_array(&cases, self.config.indent_size))
    }

    /// One-element export array for case `index`, or `None` if it is blank.
    pub fn export_one(&self, index: usize) -> Result<Option<String>, SessionError> {
        let document = self.document(index)?;
        if is_blank(document) {
            return Ok(None);
        }
        Ok(Some(to_pretty_json_array(
            &[clean(document)],
            self.config.indent_size,
        )))
    }
}

fn validate(text: &str) -> EditStatus {
    match parse_document(text) {
        Ok(_) => EditStatus::Valid,
        Err(err) => EditStatus::Invalid(err.to_string()),
    }
}

/// Moves every entry of `map` to the key `f` returns, dropping entries for
/// which it returns `None`.
fn rekey<T>(map: &mut BTreeMap<usize, T>, f: impl Fn(usize) -> Option<usize>) {
    let old = std::mem::take(map);
    *map = old
        .into_iter()
        .filter_map(|(k, v)| f(k).map(|k| (k, v)))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(docs: &[&str]) -> Session {
        let documents = docs.iter().map(|d| parse_document(d).unwrap()).collect();
        Session::with_documents(documents, Config::default())
    }

    #[test]
    fn test_rekey_after_remove() {
        let mut map: BTreeMap<usize, &str> = [(0, "a"), (1, "b"), (2, "c")].into_iter().collect();
        rekey(&mut map, |k| match k {
            1 => None,
            k if k > 1 => Some(k - 1),
            k => Some(k),
        });
        assert_eq!(map.into_iter().collect::<Vec<_>>(), vec![(0, "a"), (1, "c")]);
    }

    #[test]
    fn test_new_session_is_empty_by_default() {
        let session = Session::new(Config::default());
        assert!(session.is_empty());
        assert!(session.export_payload().is_none());
    }

    #[test]
    fn test_keep_one_case_seeds_blank_template() {
        let config = Config {
            keep_one_case: true,
            ..Config::default()
        };
        let session = Session::new(config);
        assert_eq!(session.len(), 1);
        assert!(is_blank(&session.documents()[0]));
    }

    #[test]
    fn test_seeded_case_follows_custom_template() {
        let config = Config {
            keep_one_case: true,
            ..Config::default()
        };
        let template = parse_document(r#"{"x": {"y": 1}}"#).unwrap();

        let session = Session::new(config.clone()).with_template(template.clone());
        assert_eq!(session.documents(), &[parse_document(r#"{"x": {"y": null}}"#).unwrap()]);

        // loaded cases are never replaced
        let loaded = parse_document(r#"{"a": null}"#).unwrap();
        let session = Session::with_documents(vec![loaded.clone()], config).with_template(template);
        assert_eq!(session.documents(), &[loaded]);
    }

    #[test]
    fn test_stage_does_not_touch_committed_case() {
        let mut session = session(&[r#"{"a": 1}"#]);
        let status = session.stage_edit(0, r#"{"a": }"#).unwrap();
        assert!(matches!(status, EditStatus::Invalid(_)));
        assert_eq!(session.document(0).unwrap(), &parse_document(r#"{"a": 1}"#).unwrap());
        assert_eq!(session.message().unwrap().level, MessageLevel::Error);
        assert_eq!(session.editor_text(0).unwrap(), r#"{"a": }"#);
    }

    #[test]
    fn test_editor_text_defaults_to_pretty_json() {
        let session = session(&[r#"{"a": {"b": 1}}"#]);
        assert_eq!(
            session.editor_text(0).unwrap(),
            "{\n  \"a\": {\n    \"b\": 1\n  }\n}"
        );
    }

    #[test]
    fn test_out_of_range() {
        let mut session = session(&[r#"{}"#]);
        assert_eq!(
            session.duplicate(3),
            Err(SessionError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(session.delete(1).is_err());
        assert!(session.editor_text(1).is_err());
    }
}
