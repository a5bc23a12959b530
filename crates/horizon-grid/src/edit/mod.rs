//! The edit session state machine.
//!
//! A grid holds at most one [`EditSession`]. The session moves through
//! [`EditState`]:
//!
//! ```text
//! Idle ─ begin_add ──▶ Adding  ─┐
//!      ─ begin_edit ─▶ Editing ─┼─ prepare_save ─▶ Validating ─▶ Saving ─ finish_save ─▶ Idle
//!                               └─ cancel ─▶ Cancelling ─▶ Idle
//! ```
//!
//! A failed validation leaves the session in `Validating` with its error map
//! filled; editing a field returns it to `Adding`/`Editing`. Starting a
//! session while one is active is a no-op that leaves the active session
//! untouched.
//!
//! The manager never talks to the data source. It hands the caller a
//! [`SavePlan`] and is told afterwards whether the commit went through.

mod confirm;
mod validation;

use horizon_grid_core::logging::targets;

use crate::column::ColumnModel;
use crate::error::{ColumnError, GridError, Result};
use crate::value::{Record, Value};

pub use confirm::{AlwaysConfirm, ConfirmPrompt, ConfirmationGate};
pub use validation::{FieldValidator, ValidationErrors, ValidationRule, first_failure};

/// Phase of the edit state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditState {
    /// No session.
    #[default]
    Idle,
    /// A new record is being filled in.
    Adding,
    /// An existing record is being changed.
    Editing,
    /// The form is being, or failed to be, validated.
    Validating,
    /// A valid record is being committed.
    Saving,
    /// The session is being discarded.
    Cancelling,
}

/// Kind of edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditMode {
    /// Adding a new record.
    Add,
    /// Editing an existing record.
    Edit,
}

/// An in-progress add or edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    mode: EditMode,
    key: Option<Value>,
    row_index: Option<usize>,
    original: Record,
    working: Record,
    errors: ValidationErrors,
    parse_errors: ValidationErrors,
}

impl EditSession {
    /// Add or edit.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Primary key of the edited record. `None` in add mode.
    pub fn key(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    /// View position of the edited record. `None` in add mode.
    pub fn row_index(&self) -> Option<usize> {
        self.row_index
    }

    /// The record as it was when the session started.
    pub fn original(&self) -> &Record {
        &self.original
    }

    /// The working copy.
    pub fn working(&self) -> &Record {
        &self.working
    }

    /// Per-field validation messages.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Whether the working copy differs from the original.
    pub fn is_dirty(&self) -> bool {
        self.working != self.original
    }
}

/// What to do with a session asked to save.
#[derive(Debug, Clone, PartialEq)]
pub enum SavePlan {
    /// Validation failed; nothing is committed.
    Invalid(ValidationErrors),
    /// Commit this record.
    Commit {
        /// Add or edit.
        mode: EditMode,
        /// Primary key of the record.
        key: Option<Value>,
        /// The validated working copy.
        record: Record,
    },
}

/// Drives the single edit session of a grid.
#[derive(Debug, Clone, Default)]
pub struct EditManager {
    state: EditState,
    session: Option<EditSession>,
}

impl EditManager {
    /// An idle manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn state(&self) -> EditState {
        self.state
    }

    /// The active session.
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Returns `true` while a session exists.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start adding a record seeded with the columns' default values.
    ///
    /// Returns `false` without touching anything if a session is active.
    pub fn begin_add(&mut self, columns: &ColumnModel) -> bool {
        if self.is_active() {
            tracing::debug!(target: targets::EDIT, state = ?self.state, "begin_add ignored; session active");
            return false;
        }
        let mut seed = Record::new();
        for column in columns.all_leaf_columns() {
            if let (Some(leaf), Some(field)) = (column.leaf(), column.field()) {
                seed.set_path(field, leaf.default_value.clone());
            }
        }
        self.start(EditMode::Add, None, None, seed);
        true
    }

    /// Start editing the record at `row_index` of `view`.
    ///
    /// Returns `Ok(false)` without touching anything if a session is active
    /// or the record has no primary-key value.
    pub fn begin_edit(&mut self, row_index: usize, view: &[Record], columns: &ColumnModel) -> Result<bool> {
        if self.is_active() {
            tracing::debug!(target: targets::EDIT, state = ?self.state, "begin_edit ignored; session active");
            return Ok(false);
        }
        let record = view.get(row_index).ok_or(GridError::RowOutOfRange {
            index: row_index,
            len: view.len(),
        })?;
        let Some(key) = columns.key_of(record) else {
            tracing::debug!(target: targets::EDIT, row_index, "begin_edit ignored; no primary key value");
            return Ok(false);
        };
        self.start(EditMode::Edit, Some(key), Some(row_index), record.clone());
        Ok(true)
    }

    fn start(&mut self, mode: EditMode, key: Option<Value>, row_index: Option<usize>, record: Record) {
        self.state = match mode {
            EditMode::Add => EditState::Adding,
            EditMode::Edit => EditState::Editing,
        };
        tracing::debug!(target: targets::EDIT, ?mode, key = ?key, "edit session started");
        self.session = Some(EditSession {
            mode,
            key,
            row_index,
            original: record.clone(),
            working: record,
            errors: ValidationErrors::new(),
            parse_errors: ValidationErrors::new(),
        });
    }

    /// Set a field of the working copy.
    ///
    /// Read-only and identity columns refuse edits, and so does the primary
    /// key of an existing record. A field that already shows an error is
    /// re-validated.
    pub fn set_field(&mut self, field: &str, value: impl Into<Value>, columns: &ColumnModel) -> Result<()> {
        let mode = self.session.as_ref().ok_or(GridError::NoActiveSession)?.mode;
        check_editable(field, mode, columns)?;
        let had_error = {
            let session = self.session_mut()?;
            session.working.set_path(field, value);
            session.parse_errors.remove(field);
            session.errors.contains(field)
        };
        self.resume();
        if had_error {
            self.validate_field(field, columns);
        }
        Ok(())
    }

    /// Parse `text` with the column's formatter and set the field.
    ///
    /// Unparseable text leaves the working value alone and records a field
    /// error instead of failing.
    pub fn set_field_text(&mut self, field: &str, text: &str, columns: &ColumnModel) -> Result<()> {
        let mode = self.session.as_ref().ok_or(GridError::NoActiveSession)?.mode;
        check_editable(field, mode, columns)?;
        let leaf = columns
            .column_by_field(field)
            .and_then(|c| c.leaf())
            .ok_or_else(|| ColumnError::UnknownField(field.to_string()))?;
        match leaf.formatter.parse(text) {
            Ok(value) => self.set_field(field, value, columns),
            Err(err) => {
                tracing::debug!(target: targets::EDIT, field, %err, "field text rejected");
                let session = self.session_mut()?;
                session.parse_errors.insert(field, err.to_string());
                session.errors.insert(field, err.to_string());
                Ok(())
            }
        }
    }

    /// Run a field's rules against the working copy and record the outcome.
    ///
    /// Returns the first failing rule's message. Returns `None` when no
    /// session is active, the field is unknown, or the form would not
    /// validate it either (identity columns, and the key of an edited
    /// record).
    pub fn validate_field(&mut self, field: &str, columns: &ColumnModel) -> Option<String> {
        let leaf = columns.column_by_field(field).and_then(|c| c.leaf())?;
        let session = self.session.as_mut()?;
        if !is_validated(leaf.is_identity, leaf.is_primary_key, session.mode) {
            session.errors.remove(field);
            return None;
        }
        let message = session
            .parse_errors
            .get(field)
            .map(str::to_string)
            .or_else(|| {
                let value = session.working.get_path(field).cloned().unwrap_or_default();
                first_failure(&leaf.validation_rules, &value, &session.working)
            });
        match &message {
            Some(message) => session.errors.insert(field, message.clone()),
            None => {
                session.errors.remove(field);
            }
        }
        message
    }

    /// Validate every editable leaf field and replace the error map.
    ///
    /// Moves the session into `Validating`. Returns the error map, empty when
    /// the form is valid; with no session the map is empty.
    pub fn validate_form(&mut self, columns: &ColumnModel) -> ValidationErrors {
        let Some(session) = self.session.as_mut() else {
            return ValidationErrors::new();
        };
        self.state = EditState::Validating;
        let mut errors = session.parse_errors.clone();
        for column in columns.all_leaf_columns() {
            let (Some(leaf), Some(field)) = (column.leaf(), column.field()) else {
                continue;
            };
            if errors.contains(field) || !is_validated(leaf.is_identity, leaf.is_primary_key, session.mode) {
                continue;
            }
            let value = session.working.get_path(field).cloned().unwrap_or_default();
            if let Some(message) = first_failure(&leaf.validation_rules, &value, &session.working) {
                errors.insert(field, message);
            }
        }
        tracing::debug!(target: targets::EDIT, errors = errors.len(), "form validated");
        session.errors = errors.clone();
        errors
    }

    /// Validate and, when valid, move into `Saving` with the record to
    /// commit.
    pub fn prepare_save(&mut self, columns: &ColumnModel) -> Result<SavePlan> {
        if !self.is_active() {
            return Err(GridError::NoActiveSession);
        }
        let errors = self.validate_form(columns);
        if !errors.is_empty() {
            tracing::debug!(target: targets::EDIT, fields = ?errors.iter().map(|(f, _)| f).collect::<Vec<_>>(), "save rejected");
            return Ok(SavePlan::Invalid(errors));
        }
        let session = self.session.as_ref().ok_or(GridError::NoActiveSession)?;
        let key = match session.mode {
            EditMode::Edit => session.key.clone(),
            EditMode::Add => columns.key_of(&session.working),
        };
        let plan = SavePlan::Commit {
            mode: session.mode,
            key,
            record: session.working.clone(),
        };
        self.state = EditState::Saving;
        Ok(plan)
    }

    /// The commit went through: end the session.
    pub fn finish_save(&mut self) -> Option<EditSession> {
        let session = self.session.take();
        self.state = EditState::Idle;
        tracing::debug!(target: targets::EDIT, "edit session saved");
        session
    }

    /// The commit failed: keep the session and return to editing.
    pub fn save_failed(&mut self) {
        self.resume();
    }

    /// Discard the session. Returns it, or `None` if nothing was active.
    pub fn cancel(&mut self) -> Option<EditSession> {
        let session = self.session.take()?;
        self.state = EditState::Cancelling;
        tracing::debug!(target: targets::EDIT, mode = ?session.mode, dirty = session.is_dirty(), "edit session cancelled");
        self.state = EditState::Idle;
        Some(session)
    }

    /// Whether the caller may proceed past the active session.
    ///
    /// With no session this is `true`. With one, and `show_dialog` set, the
    /// gate is asked to discard changes and its answer is returned.
    pub fn check_unsaved_changes(&self, gate: &dyn ConfirmationGate, show_dialog: bool) -> bool {
        if !self.is_active() || !show_dialog {
            return true;
        }
        let confirmed = gate.confirm(&ConfirmPrompt::DiscardChanges);
        if !confirmed {
            tracing::debug!(target: targets::EDIT, "unsaved changes kept");
        }
        confirmed
    }

    fn resume(&mut self) {
        if let Some(session) = &self.session {
            self.state = match session.mode {
                EditMode::Add => EditState::Adding,
                EditMode::Edit => EditState::Editing,
            };
        }
    }

    fn session_mut(&mut self) -> Result<&mut EditSession> {
        self.session.as_mut().ok_or(GridError::NoActiveSession)
    }
}

fn is_validated(is_identity: bool, is_primary_key: bool, mode: EditMode) -> bool {
    !is_identity && !(is_primary_key && mode == EditMode::Edit)
}

fn check_editable(field: &str, mode: EditMode, columns: &ColumnModel) -> Result<()> {
    let leaf = columns
        .column_by_field(field)
        .and_then(|c| c.leaf())
        .ok_or_else(|| ColumnError::UnknownField(field.to_string()))?;
    if !leaf.allow_editing || !is_validated(leaf.is_identity, leaf.is_primary_key, mode) {
        return Err(ColumnError::OperationNotAllowed {
            field: field.to_string(),
            operation: "editing",
        }
        .into());
    }
    Ok(())
}
