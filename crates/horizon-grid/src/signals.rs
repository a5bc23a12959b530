//! Notifications emitted by a grid.
//!
//! Every committed action is bracketed by `action_begin` and either
//! `action_complete` or `action_failure`. Slots connected to
//! `action_begin` may veto the action through [`ActionArgs::cancel`] before
//! anything changes.
//!
//! # Example
//!
//! ```
//! use horizon_grid::signals::{GridSignals, RequestType};
//!
//! let signals = GridSignals::default();
//! signals.action_begin.connect(|args| {
//!     if args.request_type == RequestType::Delete {
//!         args.cancel.cancel();
//!     }
//! });
//! ```

use std::fmt;

use horizon_grid_core::logging::targets;
use horizon_grid_core::{CancelFlag, Signal};

use crate::error::GridError;
use crate::query::{FilterPredicate, SortDescriptor};
use crate::value::{Record, Value};

/// Kind of action a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// Initial load or explicit refresh.
    Refresh,
    /// Page change.
    Paging,
    /// Sort change.
    Sorting,
    /// Filter change.
    Filtering,
    /// Search change.
    Searching,
    /// Edit session started on an existing record.
    BeginEdit,
    /// Add session started, or a record added directly.
    Add,
    /// Edit session committed, or a record updated directly.
    Save,
    /// Edit session discarded.
    Cancel,
    /// Record deletion.
    Delete,
    /// Column visibility or order change.
    ColumnState,
}

/// Payload describing the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDetail {
    /// Nothing beyond the request type.
    None,
    /// Page change.
    Page {
        /// Current page.
        from: usize,
        /// Requested page.
        to: usize,
    },
    /// Sort keys after the change.
    Sort(Vec<SortDescriptor>),
    /// Filter predicates after the change.
    Filter(Vec<FilterPredicate>),
    /// Search text.
    Search(String),
    /// Target record key, if known.
    Record(Option<Value>),
}

/// Arguments of `action_begin`.
#[derive(Debug, Clone)]
pub struct ActionArgs {
    /// Action kind.
    pub request_type: RequestType,
    /// Action payload.
    pub detail: ActionDetail,
    /// Set by a slot to abort the action.
    pub cancel: CancelFlag,
}

impl ActionArgs {
    pub(crate) fn new(request_type: RequestType, detail: ActionDetail) -> Self {
        Self {
            request_type,
            detail,
            cancel: CancelFlag::new(),
        }
    }
}

/// Arguments of `action_complete`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionComplete {
    /// Action kind.
    pub request_type: RequestType,
    /// Action payload.
    pub detail: ActionDetail,
}

/// Arguments of `action_failure`.
#[derive(Debug)]
pub struct ActionFailure {
    /// Action kind.
    pub request_type: RequestType,
    /// What went wrong.
    pub error: GridError,
}

/// Arguments of `data_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBound {
    /// Records in the view window.
    pub rows: usize,
    /// Matching records before paging.
    pub total_count: usize,
}

/// Arguments of `row_selected` and `row_deselected`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSelectionArgs {
    /// Position in the view window.
    pub index: usize,
    /// The record at that position, if any.
    pub record: Option<Record>,
}

/// The notification surface of a grid.
#[derive(Default)]
pub struct GridSignals {
    /// Before an action commits; cancellable.
    pub action_begin: Signal<ActionArgs>,
    /// After an action completed.
    pub action_complete: Signal<ActionComplete>,
    /// An action failed.
    pub action_failure: Signal<ActionFailure>,
    /// A query result was applied to the view.
    pub data_bound: Signal<DataBound>,
    /// Row model regeneration starts.
    pub render_start: Signal<()>,
    /// Row model regeneration finished.
    pub render_complete: Signal<()>,
    /// A row became selected.
    pub row_selected: Signal<RowSelectionArgs>,
    /// A row stopped being selected.
    pub row_deselected: Signal<RowSelectionArgs>,
    /// A query started (`true`) or the last in-flight query settled (`false`).
    pub busy_changed: Signal<bool>,
}

impl GridSignals {
    /// Emit `action_begin` and report whether a slot cancelled.
    pub(crate) fn begin(&self, request_type: RequestType, detail: ActionDetail) -> bool {
        let args = ActionArgs::new(request_type, detail);
        let cancel = args.cancel.clone();
        self.action_begin.emit(args);
        if cancel.is_cancelled() {
            tracing::debug!(target: targets::VIEW, ?request_type, "action cancelled");
            return false;
        }
        true
    }

    pub(crate) fn complete(&self, request_type: RequestType, detail: ActionDetail) {
        self.action_complete.emit(ActionComplete {
            request_type,
            detail,
        });
    }

    pub(crate) fn fail(&self, request_type: RequestType, error: impl Into<GridError>) {
        let error = error.into();
        tracing::warn!(target: targets::VIEW, ?request_type, %error, "action failed");
        self.action_failure.emit(ActionFailure { request_type, error });
    }
}

impl fmt::Debug for GridSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSignals")
            .field("action_begin", &self.action_begin.connection_count())
            .field("action_complete", &self.action_complete.connection_count())
            .field("action_failure", &self.action_failure.connection_count())
            .field("data_bound", &self.data_bound.connection_count())
            .finish_non_exhaustive()
    }
}
