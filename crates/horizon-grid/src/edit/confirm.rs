//! Confirmation prompts raised before destructive edits.

use crate::value::Value;

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmPrompt {
    /// Delete the record with this key.
    DeleteRecord {
        /// Primary-key value of the record.
        key: Value,
    },
    /// Discard the active edit session.
    DiscardChanges,
}

/// Answers confirmation prompts, usually by showing a dialog.
pub trait ConfirmationGate: Send + Sync {
    /// Returns `true` when the user confirms.
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: Fn(&ConfirmPrompt) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self(prompt)
    }
}

/// A gate that confirms everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmationGate for AlwaysConfirm {
    fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        true
    }
}
