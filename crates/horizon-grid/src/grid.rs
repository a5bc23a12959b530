//! The grid: one column model, one view, one edit session, one selection.
//!
//! [`Grid`] ties the components together behind the imperative API an
//! embedding application calls. Every view change follows the same
//! pipeline:
//!
//! 1. `action_begin` is emitted; a slot may cancel.
//! 2. The view state is updated.
//! 3. One query is issued to the data source and awaited.
//! 4. The response is applied (unless a newer request superseded it), the
//!    row model is regenerated, and the selection follows its policy.
//! 5. `data_bound` and `action_complete` fire, or `action_failure`.
//!
//! Internal state sits behind a mutex that is never held across an await
//! point or while a signal is emitted, so slots may call back into the grid.
//!
//! # Example
//!
//! ```
//! use horizon_grid::column::ColumnDef;
//! use horizon_grid::query::{LocalDataSource, SortDirection};
//! use horizon_grid::{Grid, GridSettings, Record};
//!
//! # tokio_test_block(async {
//! let source = LocalDataSource::new(vec![
//!     Record::new().with("OrderID", 1).with("Freight", 10.0),
//!     Record::new().with("OrderID", 2).with("Freight", 50.0),
//! ]);
//! let grid = Grid::builder(source)
//!     .columns(vec![ColumnDef::new("OrderID").primary_key(true), ColumnDef::new("Freight")])
//!     .settings(GridSettings::default().with_page_size(8))
//!     .build()
//!     .unwrap();
//!
//! grid.refresh().await;
//! grid.sort_by_column("Freight", SortDirection::Descending, false).await.unwrap();
//! assert_eq!(grid.get_current_view_records()[0].get("OrderID"), Some(&2.into()));
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::{span_names, targets};
use parking_lot::Mutex;

use crate::column::{Column, ColumnDef, ColumnModel, ColumnResolver, LeafColumn};
use crate::edit::{
    AlwaysConfirm, ConfirmPrompt, ConfirmationGate, EditManager, EditMode, EditSession, EditState,
    SavePlan, ValidationErrors,
};
use crate::error::{ColumnError, GridError, QueryError, Result};
use crate::query::{
    Combinator, DataSource, FilterOperator, FilterPredicate, QueryResult, SortDescriptor, SortDirection,
};
use crate::row::{AggregateRowDef, GridContext, RowModel};
use crate::selection::{SelectionChange, SelectionManager};
use crate::settings::GridSettings;
use crate::signals::{ActionDetail, DataBound, GridSignals, RequestType, RowSelectionArgs};
use crate::value::{Record, Value};
use crate::view::{LoadOutcome, QueryTicket, ViewState, ViewStateController};

/// Result of saving an edit session or writing a record directly.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The record was written and the view reloaded.
    Saved(LoadOutcome),
    /// Validation failed; the session stays open with its error map.
    Invalid(ValidationErrors),
    /// A slot cancelled the save.
    Cancelled,
    /// The data source refused the write.
    Failed(QueryError),
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The record was removed and the view reloaded.
    Deleted(LoadOutcome),
    /// The user declined the confirmation prompt.
    Declined,
    /// A slot cancelled the delete.
    Cancelled,
    /// No key was given and no row is selected.
    NothingSelected,
    /// The data source refused the delete.
    Failed(QueryError),
}

/// Builds a [`Grid`].
pub struct GridBuilder {
    id: String,
    source: Arc<dyn DataSource>,
    columns: Option<Vec<ColumnDef>>,
    settings: GridSettings,
    aggregates: Vec<AggregateRowDef>,
    gate: Arc<dyn ConfirmationGate>,
}

impl GridBuilder {
    /// A builder over `source`.
    pub fn new(source: impl DataSource + 'static) -> Self {
        Self {
            id: "grid".to_string(),
            source: Arc::new(source),
            columns: None,
            settings: GridSettings::default(),
            aggregates: Vec::new(),
            gate: Arc::new(AlwaysConfirm),
        }
    }

    /// Prefix of generated row ids.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Declared columns. Without them, columns are inferred from the first
    /// record of the first load.
    pub fn columns(mut self, columns: Vec<ColumnDef>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Grid settings.
    pub fn settings(mut self, settings: GridSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add a footer aggregate row.
    pub fn aggregate(mut self, row: AggregateRowDef) -> Self {
        self.aggregates.push(row);
        self
    }

    /// Gate asked before deleting and before discarding unsaved changes.
    pub fn confirmation_gate(mut self, gate: impl ConfirmationGate + 'static) -> Self {
        self.gate = Arc::new(gate);
        self
    }

    /// Resolve the columns and create the grid. No query is issued yet.
    pub fn build(self) -> Result<Grid> {
        let resolver = ColumnResolver::with_locale(&self.settings.locale);
        let infer_columns = self.columns.is_none();
        let columns = resolver.resolve(self.columns.unwrap_or_default())?;
        if self.settings.edit.any_enabled() && columns.primary_key_field().is_none() {
            return Err(GridError::MissingPrimaryKey);
        }

        tracing::debug!(
            target: targets::VIEW,
            id = %self.id,
            leaves = columns.all_leaf_columns().len(),
            depth = columns.depth(),
            infer_columns,
            "grid created"
        );

        let view = ViewStateController::new(&self.settings, GridContext::new(self.id), self.aggregates);
        let selection = SelectionManager::new(self.settings.selection);
        Ok(Grid {
            source: self.source,
            settings: self.settings,
            gate: self.gate,
            resolver,
            signals: GridSignals::default(),
            inner: Mutex::new(GridInner {
                columns,
                infer_columns,
                types_inferred: false,
                view,
                edit: EditManager::new(),
                selection,
            }),
        })
    }
}

impl fmt::Debug for GridBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridBuilder")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

struct GridInner {
    columns: ColumnModel,
    infer_columns: bool,
    types_inferred: bool,
    view: ViewStateController,
    edit: EditManager,
    selection: SelectionManager,
}

/// A headless data grid.
pub struct Grid {
    source: Arc<dyn DataSource>,
    settings: GridSettings,
    gate: Arc<dyn ConfirmationGate>,
    resolver: ColumnResolver,
    signals: GridSignals,
    inner: Mutex<GridInner>,
}

impl Grid {
    /// Start building a grid over `source`.
    pub fn builder(source: impl DataSource + 'static) -> GridBuilder {
        GridBuilder::new(source)
    }

    /// Notifications.
    pub fn signals(&self) -> &GridSignals {
        &self.signals
    }

    /// Settings the grid was built with.
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    // View changes

    /// Reload the current view.
    pub async fn refresh(&self) -> LoadOutcome {
        self.commit_view_change(RequestType::Refresh, ActionDetail::None, |_| Ok(()))
            .await
            .unwrap_or(LoadOutcome::Cancelled)
    }

    /// Move to `page` (1-based).
    ///
    /// With an active edit session the confirmation gate is asked first when
    /// the settings want it; declining cancels the page change. The session
    /// is discarded only once `action_begin` lets the change through.
    pub async fn go_to_page(&self, page: usize) -> Result<LoadOutcome> {
        let (from, page_count) = {
            let inner = self.inner.lock();
            let state = inner.view.state();
            (state.current_page, state.page_count())
        };
        if page == 0 || page > page_count {
            return Err(GridError::PageOutOfRange { page, page_count });
        }
        if !self.check_unsaved_changes() {
            return Ok(LoadOutcome::Cancelled);
        }
        let detail = ActionDetail::Page { from, to: page };
        if !self.signals.begin(RequestType::Paging, detail.clone()) {
            return Ok(LoadOutcome::Cancelled);
        }
        self.discard_edit_session();
        self.apply_view_change(RequestType::Paging, detail, |inner| inner.view.set_page(page))
            .await
    }

    /// Sort by a column. With `multi` the key is added to the existing ones.
    pub async fn sort_by_column(&self, field: &str, direction: SortDirection, multi: bool) -> Result<LoadOutcome> {
        self.check_column(field, |leaf| leaf.allow_sorting, "sorting")?;
        let detail = ActionDetail::Sort(vec![SortDescriptor::new(field, direction)]);
        self.commit_view_change(RequestType::Sorting, detail, |inner| {
            inner.view.sort_by_column(field, direction, multi);
            Ok(())
        })
        .await
    }

    /// Drop the sort key on one column.
    pub async fn remove_sort_column(&self, field: &str) -> Result<LoadOutcome> {
        let remaining: Vec<SortDescriptor> = {
            let inner = self.inner.lock();
            inner.view.state().sort.iter().filter(|s| s.field != field).cloned().collect()
        };
        self.commit_view_change(RequestType::Sorting, ActionDetail::Sort(remaining), |inner| {
            inner.view.remove_sort_column(field);
            Ok(())
        })
        .await
    }

    /// Drop every sort key.
    pub async fn clear_sort(&self) -> Result<LoadOutcome> {
        self.commit_view_change(RequestType::Sorting, ActionDetail::Sort(Vec::new()), |inner| {
            inner.view.clear_sort();
            Ok(())
        })
        .await
    }

    /// Filter a column.
    ///
    /// `combinator` joins the predicate with existing ones on the same field;
    /// without it they are replaced. Text comparison ignores case unless
    /// `case_sensitive` is `Some(true)`.
    pub async fn filter_by_column(
        &self,
        field: &str,
        operator: FilterOperator,
        value: impl Into<Value>,
        combinator: Option<Combinator>,
        case_sensitive: Option<bool>,
    ) -> Result<LoadOutcome> {
        self.check_column(field, |leaf| leaf.allow_filtering, "filtering")?;
        let predicate =
            FilterPredicate::new(field, operator, value).with_case_sensitive(case_sensitive.unwrap_or(false));
        let detail = ActionDetail::Filter(vec![predicate.clone()]);
        self.commit_view_change(RequestType::Filtering, detail, |inner| {
            inner.view.filter_by_column(predicate, combinator);
            Ok(())
        })
        .await
    }

    /// Drop the predicates on one column.
    pub async fn remove_filtered_columns(&self, field: &str) -> Result<LoadOutcome> {
        let remaining: Vec<FilterPredicate> = {
            let inner = self.inner.lock();
            inner.view.state().filters.iter().filter(|f| f.field != field).cloned().collect()
        };
        self.commit_view_change(RequestType::Filtering, ActionDetail::Filter(remaining), |inner| {
            inner.view.remove_filtered_column(field);
            Ok(())
        })
        .await
    }

    /// Drop every filter predicate.
    pub async fn clear_filter(&self) -> Result<LoadOutcome> {
        self.commit_view_change(RequestType::Filtering, ActionDetail::Filter(Vec::new()), |inner| {
            inner.view.clear_filter();
            Ok(())
        })
        .await
    }

    /// Search the displayed columns. Empty text clears the search.
    pub async fn search(&self, text: &str) -> Result<LoadOutcome> {
        self.commit_view_change(RequestType::Searching, ActionDetail::Search(text.to_string()), |inner| {
            inner.view.set_search(text);
            Ok(())
        })
        .await
    }

    /// Stamp a query for the current state without running it.
    ///
    /// For callers that drive the data source themselves; hand the response
    /// to [`complete_query`](Self::complete_query).
    pub fn issue_query(&self) -> QueryTicket {
        let (ticket, became_busy) = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let was_busy = inner.view.is_busy();
            (inner.view.issue(&inner.columns, &self.settings.search), !was_busy)
        };
        if became_busy {
            self.signals.busy_changed.emit(true);
        }
        ticket
    }

    /// Apply a data-source response to the ticket with `generation`.
    pub fn complete_query(
        &self,
        generation: u64,
        response: std::result::Result<QueryResult, QueryError>,
        request_type: RequestType,
    ) -> LoadOutcome {
        let _perf = PerfSpan::new(span_names::QUERY);
        let current = self.inner.lock().view.is_current(generation);
        if current {
            self.signals.render_start.emit(());
        }

        let (outcome, selected, deselected, idle) = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            if current {
                if let Ok(result) = &response {
                    if let Some(first) = result.result.first() {
                        self.adopt_sample(inner, first);
                    }
                }
            }
            let previous = if current {
                inner.view.records().to_vec()
            } else {
                Vec::new()
            };
            let outcome = inner.view.apply(generation, response, &inner.columns);
            let change = match outcome {
                LoadOutcome::Loaded { .. } | LoadOutcome::Failed(_) => {
                    inner
                        .selection
                        .on_view_changed(&previous, inner.view.records(), &inner.columns)
                }
                LoadOutcome::Stale | LoadOutcome::Cancelled => SelectionChange::default(),
            };
            inner.selection.mark_rows(&mut inner.view.row_model_mut().rows);
            let (selected, deselected) = selection_args(&change, inner.view.records(), &previous);
            (outcome, selected, deselected, !inner.view.is_busy())
        };

        match &outcome {
            LoadOutcome::Loaded { rows, total_count } => {
                self.signals.render_complete.emit(());
                self.signals.data_bound.emit(DataBound {
                    rows: *rows,
                    total_count: *total_count,
                });
            }
            LoadOutcome::Failed(err) => {
                self.signals.render_complete.emit(());
                self.signals.fail(request_type, err.clone());
            }
            LoadOutcome::Stale | LoadOutcome::Cancelled => {}
        }
        self.emit_selection(selected, deselected);
        if idle {
            self.signals.busy_changed.emit(false);
        }
        outcome
    }

    // Editing

    /// Start adding a record. Returns `false` if a session is already active
    /// or a slot cancelled.
    pub fn begin_add(&self) -> Result<bool> {
        require(self.settings.edit.allow_adding, "adding")?;
        if self.inner.lock().edit.is_active() {
            return Ok(false);
        }
        if !self.signals.begin(RequestType::Add, ActionDetail::None) {
            return Ok(false);
        }
        let started = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            inner.edit.begin_add(&inner.columns)
        };
        if started {
            self.signals.complete(RequestType::Add, ActionDetail::None);
        }
        Ok(started)
    }

    /// Start editing the record at `row_index` of the current view.
    ///
    /// Returns `false` if a session is already active, the record has no
    /// primary-key value, or a slot cancelled.
    pub fn begin_edit(&self, row_index: usize) -> Result<bool> {
        require(self.settings.edit.allow_editing, "editing")?;
        let key = {
            let inner = self.inner.lock();
            if inner.edit.is_active() {
                return Ok(false);
            }
            let records = inner.view.records();
            let record = records.get(row_index).ok_or(GridError::RowOutOfRange {
                index: row_index,
                len: records.len(),
            })?;
            inner.columns.key_of(record)
        };
        let Some(key) = key else {
            return Ok(false);
        };
        let detail = ActionDetail::Record(Some(key));
        if !self.signals.begin(RequestType::BeginEdit, detail.clone()) {
            return Ok(false);
        }
        let started = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            inner.edit.begin_edit(row_index, inner.view.records(), &inner.columns)?
        };
        if started {
            self.signals.complete(RequestType::BeginEdit, detail);
        }
        Ok(started)
    }

    /// Start editing the first selected row. Returns `false` with nothing
    /// selected.
    pub fn edit_record(&self) -> Result<bool> {
        let first = self.inner.lock().selection.selected_indexes().first().copied();
        match first {
            Some(index) => self.begin_edit(index),
            None => Ok(false),
        }
    }

    /// Set a field of the active session's working copy.
    pub fn set_edit_field(&self, field: &str, value: impl Into<Value>) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.edit.set_field(field, value, &inner.columns)
    }

    /// Parse display text into a field of the active session's working copy.
    pub fn set_edit_field_text(&self, field: &str, text: &str) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.edit.set_field_text(field, text, &inner.columns)
    }

    /// Validate one field of the active session.
    pub fn validate_field(&self, field: &str) -> Option<String> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.edit.validate_field(field, &inner.columns)
    }

    /// Validate every field of the active session.
    pub fn validate_form(&self) -> ValidationErrors {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.edit.validate_form(&inner.columns)
    }

    /// Phase of the edit state machine.
    pub fn edit_state(&self) -> EditState {
        self.inner.lock().edit.state()
    }

    /// A copy of the active session.
    pub fn edit_session(&self) -> Option<EditSession> {
        self.inner.lock().edit.session().cloned()
    }

    /// Validate and commit the active session.
    pub async fn save(&self) -> Result<SaveOutcome> {
        let (plan, key_field) = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let plan = inner.edit.prepare_save(&inner.columns)?;
            (plan, inner.columns.primary_key_field().map(str::to_string))
        };
        let (mode, key, record) = match plan {
            SavePlan::Invalid(errors) => return Ok(SaveOutcome::Invalid(errors)),
            SavePlan::Commit { mode, key, record } => (mode, key, record),
        };
        let Some(key_field) = key_field else {
            self.inner.lock().edit.save_failed();
            return Err(GridError::MissingPrimaryKey);
        };

        let detail = ActionDetail::Record(key);
        if !self.signals.begin(RequestType::Save, detail.clone()) {
            self.inner.lock().edit.save_failed();
            return Ok(SaveOutcome::Cancelled);
        }
        let written = match mode {
            EditMode::Add => {
                self.source
                    .insert(&key_field, record, self.settings.edit.new_row_position)
                    .await
            }
            EditMode::Edit => self.source.update(&key_field, record).await,
        };
        if let Err(err) = written {
            self.inner.lock().edit.save_failed();
            self.signals.fail(RequestType::Save, err.clone());
            return Ok(SaveOutcome::Failed(err));
        }
        self.inner.lock().edit.finish_save();

        let load = self.load(RequestType::Save).await;
        self.signals.complete(RequestType::Save, detail);
        Ok(SaveOutcome::Saved(load))
    }

    /// Commit pending changes. Same as [`save`](Self::save).
    pub async fn save_data_changes(&self) -> Result<SaveOutcome> {
        self.save().await
    }

    /// Discard the active session. Returns `false` if none was active or a
    /// slot cancelled.
    pub fn cancel(&self) -> bool {
        if !self.inner.lock().edit.is_active() {
            return false;
        }
        if !self.signals.begin(RequestType::Cancel, ActionDetail::None) {
            return false;
        }
        let cancelled = self.inner.lock().edit.cancel().is_some();
        if cancelled {
            self.signals.complete(RequestType::Cancel, ActionDetail::None);
        }
        cancelled
    }

    /// Discard pending changes. Same as [`cancel`](Self::cancel).
    pub fn cancel_data_changes(&self) -> bool {
        self.cancel()
    }

    /// Ask whether the active session may be left behind.
    ///
    /// `true` with no session; otherwise the confirmation gate decides when
    /// the settings ask for a dialog.
    pub fn check_unsaved_changes(&self) -> bool {
        let edit = self.inner.lock().edit.clone();
        edit.check_unsaved_changes(self.gate.as_ref(), self.settings.edit.show_unsaved_confirm_dialog)
    }

    /// Insert a record directly, without an edit session.
    pub async fn add_record(&self, record: Record) -> Result<SaveOutcome> {
        require(self.settings.edit.allow_adding, "adding")?;
        let (key_field, key) = {
            let inner = self.inner.lock();
            let key_field = inner
                .columns
                .primary_key_field()
                .map(str::to_string)
                .ok_or(GridError::MissingPrimaryKey)?;
            (key_field, inner.columns.key_of(&record))
        };
        let detail = ActionDetail::Record(key);
        if !self.signals.begin(RequestType::Add, detail.clone()) {
            return Ok(SaveOutcome::Cancelled);
        }
        if let Err(err) = self
            .source
            .insert(&key_field, record, self.settings.edit.new_row_position)
            .await
        {
            self.signals.fail(RequestType::Add, err.clone());
            return Ok(SaveOutcome::Failed(err));
        }
        let load = self.load(RequestType::Add).await;
        self.signals.complete(RequestType::Add, detail);
        Ok(SaveOutcome::Saved(load))
    }

    /// Merge `data` into the record at `row_index` of the current view and
    /// write it through the data source. The primary key cannot change.
    pub async fn update_record(&self, row_index: usize, data: Record) -> Result<SaveOutcome> {
        require(self.settings.edit.allow_editing, "editing")?;
        let (key_field, key, merged) = {
            let inner = self.inner.lock();
            let key_field = inner
                .columns
                .primary_key_field()
                .map(str::to_string)
                .ok_or(GridError::MissingPrimaryKey)?;
            let records = inner.view.records();
            let record = records.get(row_index).ok_or(GridError::RowOutOfRange {
                index: row_index,
                len: records.len(),
            })?;
            let key = inner
                .columns
                .key_of(record)
                .ok_or_else(|| GridError::RecordNotFound(format!("row {row_index}")))?;
            let mut merged = record.clone();
            merged.merge(&data);
            merged.set_path(&key_field, key.clone());
            (key_field, key, merged)
        };
        let detail = ActionDetail::Record(Some(key));
        if !self.signals.begin(RequestType::Save, detail.clone()) {
            return Ok(SaveOutcome::Cancelled);
        }
        if let Err(err) = self.source.update(&key_field, merged).await {
            self.signals.fail(RequestType::Save, err.clone());
            return Ok(SaveOutcome::Failed(err));
        }
        let load = self.load(RequestType::Save).await;
        self.signals.complete(RequestType::Save, detail);
        Ok(SaveOutcome::Saved(load))
    }

    /// Delete the record with `key`, or the first selected record.
    ///
    /// When the settings ask for it, the confirmation gate is consulted
    /// first; declining changes nothing. If the current page becomes empty,
    /// the view moves back to the last page that has records.
    pub async fn delete_record(&self, key: Option<Value>) -> Result<DeleteOutcome> {
        require(self.settings.edit.allow_deleting, "deleting")?;
        let (key_field, key) = {
            let inner = self.inner.lock();
            let key_field = inner
                .columns
                .primary_key_field()
                .map(str::to_string)
                .ok_or(GridError::MissingPrimaryKey)?;
            let key = key.or_else(|| {
                inner
                    .selection
                    .selected_records(inner.view.records())
                    .into_iter()
                    .flatten()
                    .find_map(|record| inner.columns.key_of(record))
            });
            (key_field, key)
        };
        let Some(key) = key else {
            return Ok(DeleteOutcome::NothingSelected);
        };

        if self.settings.edit.show_delete_confirm_dialog
            && !self.gate.confirm(&ConfirmPrompt::DeleteRecord { key: key.clone() })
        {
            tracing::debug!(target: targets::EDIT, %key, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }
        let detail = ActionDetail::Record(Some(key.clone()));
        if !self.signals.begin(RequestType::Delete, detail.clone()) {
            return Ok(DeleteOutcome::Cancelled);
        }
        if let Err(err) = self.source.remove(&key_field, key).await {
            self.signals.fail(RequestType::Delete, err.clone());
            return Ok(DeleteOutcome::Failed(err));
        }

        let mut load = self.load(RequestType::Delete).await;
        let last_page = {
            let mut inner = self.inner.lock();
            let state = inner.view.state();
            let page_count = state.page_count();
            let overshoot = load.is_loaded() && state.result.is_empty() && state.current_page > page_count;
            overshoot && inner.view.set_page(page_count).is_ok()
        };
        if last_page {
            load = self.load(RequestType::Delete).await;
        }
        self.signals.complete(RequestType::Delete, detail);
        Ok(DeleteOutcome::Deleted(load))
    }

    /// Set one field of a record in the current view, without writing to
    /// the data source.
    pub fn set_cell_value(&self, key: &Value, field: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.rerender(|inner| {
            if inner.columns.column_by_field(field).is_none() {
                return Err(ColumnError::UnknownField(field.to_string()).into());
            }
            let record = find_by_key(inner, key)?;
            record.set_path(field, value);
            Ok(())
        })
    }

    /// Merge `data` into a record in the current view, without writing to
    /// the data source.
    pub fn set_row_data(&self, key: &Value, data: Record) -> Result<()> {
        self.rerender(|inner| {
            let record = find_by_key(inner, key)?;
            record.merge(&data);
            Ok(())
        })
    }

    // Selection

    /// Select the row at `index` of the current view.
    pub fn select_row(&self, index: usize, toggle: bool) -> Result<()> {
        self.change_selection(|selection, len| selection.select_row(index, toggle, len))
    }

    /// Replace the selection with `indexes`.
    pub fn select_rows(&self, indexes: &[usize]) -> Result<()> {
        self.change_selection(|selection, len| selection.select_rows(indexes, len))
    }

    /// Select every row between `start` and `end`, inclusive.
    pub fn select_row_by_range(&self, start: usize, end: usize) -> Result<()> {
        self.change_selection(|selection, len| selection.select_row_by_range(start, end, len))
    }

    /// Drop the selection.
    pub fn clear_selection(&self) {
        if let Err(err) = self.change_selection(|selection, _| Ok(selection.clear_selection())) {
            tracing::warn!(target: targets::SELECTION, %err, "clearing the selection failed");
        }
    }

    /// Selected positions in selection order.
    pub fn get_selected_row_indexes(&self) -> Vec<usize> {
        self.inner.lock().selection.selected_indexes().to_vec()
    }

    /// Records at the selected positions, resolved against the current view.
    pub fn get_selected_records(&self) -> Vec<Option<Record>> {
        let inner = self.inner.lock();
        inner
            .selection
            .selected_records(inner.view.records())
            .into_iter()
            .map(|record| record.cloned())
            .collect()
    }

    // Column management

    /// Displayed leaf columns in display order.
    pub fn get_columns(&self) -> Vec<Column> {
        let inner = self.inner.lock();
        inner.columns.leaf_columns().into_iter().cloned().collect()
    }

    /// A copy of the whole column model.
    pub fn column_model(&self) -> ColumnModel {
        self.inner.lock().columns.clone()
    }

    /// Show columns by field or id. Returns how many changed.
    pub fn show_columns(&self, keys: &[&str]) -> Result<usize> {
        self.change_columns(|columns| columns.show_columns(keys))
    }

    /// Hide columns by field or id. Returns how many changed.
    pub fn hide_columns(&self, keys: &[&str]) -> Result<usize> {
        self.change_columns(|columns| columns.hide_columns(keys))
    }

    /// Move a column among its siblings.
    pub fn reorder_column(&self, key: &str, to_index: usize) -> Result<()> {
        self.change_columns(|columns| columns.reorder_column(key, to_index))
            .map(|_| ())
    }

    // Accessors

    /// Records of the current view window.
    pub fn get_current_view_records(&self) -> Vec<Record> {
        self.inner.lock().view.records().to_vec()
    }

    /// A copy of the current row model.
    pub fn row_model(&self) -> RowModel {
        self.inner.lock().view.row_model().clone()
    }

    /// A copy of the view state.
    pub fn view_state(&self) -> ViewState {
        self.inner.lock().view.state().clone()
    }

    /// Current page, 1-based.
    pub fn current_page(&self) -> usize {
        self.inner.lock().view.state().current_page
    }

    /// Number of pages for the last known count.
    pub fn page_count(&self) -> usize {
        self.inner.lock().view.state().page_count()
    }

    /// Matching records before paging.
    pub fn total_count(&self) -> usize {
        self.inner.lock().view.state().total_count
    }

    /// Whether a query is in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.lock().view.is_busy()
    }

    // Internals

    async fn load(&self, request_type: RequestType) -> LoadOutcome {
        let ticket = self.issue_query();
        let response = self.source.execute_query(ticket.query).await;
        self.complete_query(ticket.generation, response, request_type)
    }

    async fn commit_view_change(
        &self,
        request_type: RequestType,
        detail: ActionDetail,
        change: impl FnOnce(&mut GridInner) -> Result<()>,
    ) -> Result<LoadOutcome> {
        if !self.signals.begin(request_type, detail.clone()) {
            return Ok(LoadOutcome::Cancelled);
        }
        self.apply_view_change(request_type, detail, change).await
    }

    /// Update the view state and reload. `action_begin` has already run.
    async fn apply_view_change(
        &self,
        request_type: RequestType,
        detail: ActionDetail,
        change: impl FnOnce(&mut GridInner) -> Result<()>,
    ) -> Result<LoadOutcome> {
        {
            let mut inner = self.inner.lock();
            change(&mut *inner)?;
        }
        let outcome = self.load(request_type).await;
        if outcome.is_loaded() {
            self.signals.complete(request_type, detail);
        }
        Ok(outcome)
    }

    fn discard_edit_session(&self) {
        if self.inner.lock().edit.cancel().is_some() {
            self.signals.complete(RequestType::Cancel, ActionDetail::None);
        }
    }

    fn adopt_sample(&self, inner: &mut GridInner, sample: &Record) {
        if inner.infer_columns {
            match self.resolver.infer_columns(sample) {
                Ok(columns) => {
                    tracing::debug!(
                        target: targets::COLUMNS,
                        leaves = columns.all_leaf_columns().len(),
                        "columns inferred from first record"
                    );
                    inner.columns = columns;
                    inner.infer_columns = false;
                    inner.types_inferred = true;
                }
                Err(err) => {
                    tracing::warn!(target: targets::COLUMNS, %err, "column inference failed");
                }
            }
        } else if !inner.types_inferred {
            inner.columns.infer_types(sample);
            inner.types_inferred = true;
        }
    }

    fn check_column(&self, field: &str, allowed: fn(&LeafColumn) -> bool, operation: &'static str) -> Result<()> {
        let inner = self.inner.lock();
        if inner.infer_columns {
            return Ok(());
        }
        let leaf = inner
            .columns
            .column_by_field(field)
            .and_then(Column::leaf)
            .ok_or_else(|| ColumnError::UnknownField(field.to_string()))?;
        if !allowed(leaf) {
            return Err(ColumnError::OperationNotAllowed {
                field: field.to_string(),
                operation,
            }
            .into());
        }
        Ok(())
    }

    fn rerender<T>(&self, change: impl FnOnce(&mut GridInner) -> Result<T>) -> Result<T> {
        let out = change(&mut *self.inner.lock())?;
        self.signals.render_start.emit(());
        {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            inner.view.regenerate(&inner.columns);
            inner.selection.mark_rows(&mut inner.view.row_model_mut().rows);
        }
        self.signals.render_complete.emit(());
        Ok(out)
    }

    fn change_columns<T>(
        &self,
        change: impl FnOnce(&mut ColumnModel) -> std::result::Result<T, ColumnError>,
    ) -> Result<T> {
        if !self.signals.begin(RequestType::ColumnState, ActionDetail::None) {
            return Err(GridError::Cancelled("column change"));
        }
        let out = self.rerender(|inner| Ok(change(&mut inner.columns)?))?;
        self.signals.complete(RequestType::ColumnState, ActionDetail::None);
        Ok(out)
    }

    fn change_selection(
        &self,
        change: impl FnOnce(&mut SelectionManager, usize) -> Result<SelectionChange>,
    ) -> Result<()> {
        let (selected, deselected) = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let len = inner.view.records().len();
            let change = change(&mut inner.selection, len)?;
            inner.selection.mark_rows(&mut inner.view.row_model_mut().rows);
            let records = inner.view.records();
            selection_args(&change, records, records)
        };
        self.emit_selection(selected, deselected);
        Ok(())
    }

    fn emit_selection(&self, selected: Vec<RowSelectionArgs>, deselected: Vec<RowSelectionArgs>) {
        for args in deselected {
            self.signals.row_deselected.emit(args);
        }
        for args in selected {
            self.signals.row_selected.emit(args);
        }
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("settings", &self.settings)
            .field("signals", &self.signals)
            .finish_non_exhaustive()
    }
}

fn require(allowed: bool, operation: &'static str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(GridError::Disabled(operation))
    }
}

fn find_by_key<'a>(inner: &'a mut GridInner, key: &Value) -> Result<&'a mut Record> {
    let position = inner
        .view
        .records()
        .iter()
        .position(|record| inner.columns.key_of(record).is_some_and(|k| k.loosely_equals(key)))
        .ok_or_else(|| GridError::RecordNotFound(key.to_string()))?;
    Ok(&mut inner.view.records_mut()[position])
}

fn selection_args(
    change: &SelectionChange,
    selected_view: &[Record],
    deselected_view: &[Record],
) -> (Vec<RowSelectionArgs>, Vec<RowSelectionArgs>) {
    let args = |indexes: &[usize], view: &[Record]| {
        indexes
            .iter()
            .map(|&index| RowSelectionArgs {
                index,
                record: view.get(index).cloned(),
            })
            .collect()
    };
    (
        args(&change.selected, selected_view),
        args(&change.deselected, deselected_view),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::LocalDataSource;

    fn source() -> LocalDataSource {
        LocalDataSource::new(
            (1..=5)
                .map(|id| Record::new().with("OrderID", id).with("Freight", f64::from(id) * 10.0))
                .collect(),
        )
    }

    #[test]
    fn test_editable_grid_needs_primary_key() {
        let result = Grid::builder(source())
            .columns(vec![ColumnDef::new("OrderID"), ColumnDef::new("Freight")])
            .settings(GridSettings::default().editable())
            .build();
        assert!(matches!(result, Err(GridError::MissingPrimaryKey)));

        let result = Grid::builder(source())
            .settings(GridSettings::default().editable())
            .build();
        assert!(matches!(result, Err(GridError::MissingPrimaryKey)));
    }

    #[test]
    fn test_disabled_operations() {
        let grid = Grid::builder(source())
            .columns(vec![ColumnDef::new("OrderID").primary_key(true)])
            .build()
            .unwrap();
        assert!(matches!(grid.begin_add(), Err(GridError::Disabled("adding"))));
        assert!(matches!(grid.begin_edit(0), Err(GridError::Disabled("editing"))));
    }

    #[tokio::test]
    async fn test_columns_inferred_on_first_load() {
        let grid = Grid::builder(source()).build().unwrap();
        assert!(grid.get_columns().is_empty());
        assert!(grid.refresh().await.is_loaded());
        let fields: Vec<_> = grid
            .get_columns()
            .iter()
            .filter_map(|c| c.field().map(str::to_string))
            .collect();
        assert_eq!(fields, ["OrderID", "Freight"]);
        assert_eq!(grid.row_model().data_rows().count(), 5);
    }

    #[tokio::test]
    async fn test_set_cell_value_patches_view_only() {
        let data = source();
        let grid = Grid::builder(data.clone())
            .columns(vec![ColumnDef::new("OrderID").primary_key(true), ColumnDef::new("Freight")])
            .build()
            .unwrap();
        grid.refresh().await;

        grid.set_cell_value(&Value::Int(2), "Freight", 99.0).unwrap();
        assert_eq!(grid.get_current_view_records()[1].get("Freight"), Some(&Value::Float(99.0)));
        assert_eq!(data.records()[1].get("Freight"), Some(&Value::Float(20.0)));
        let cell = grid.row_model().rows[1].cells[1].clone();
        assert_eq!(cell.value, Value::Float(99.0));

        assert!(matches!(
            grid.set_cell_value(&Value::Int(42), "Freight", 1.0),
            Err(GridError::RecordNotFound(_))
        ));
        assert!(grid.set_cell_value(&Value::Int(2), "Nope", 1.0).is_err());

        grid.set_row_data(&Value::Int(3), Record::new().with("Freight", 1.5)).unwrap();
        assert_eq!(grid.get_current_view_records()[2].get("Freight"), Some(&Value::Float(1.5)));
    }

    #[tokio::test]
    async fn test_column_changes_regenerate() {
        let grid = Grid::builder(source())
            .columns(vec![ColumnDef::new("OrderID").primary_key(true), ColumnDef::new("Freight")])
            .build()
            .unwrap();
        grid.refresh().await;
        assert_eq!(grid.hide_columns(&["Freight"]).unwrap(), 1);
        assert_eq!(grid.row_model().rows[0].cells.len(), 1);
        grid.show_columns(&["Freight"]).unwrap();
        grid.reorder_column("Freight", 0).unwrap();
        let first = grid.row_model().header_rows[0].cells[0].header_text.clone();
        assert_eq!(first.as_deref(), Some("Freight"));
    }
}
