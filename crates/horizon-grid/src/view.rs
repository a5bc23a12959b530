//! View state and the query/regenerate pipeline.
//!
//! [`ViewState`] holds what the user asked for (page, sort keys, filters,
//! search text) together with the window the data source returned for it.
//! [`ViewStateController`] turns the state into a [`Query`], hands out a
//! [`QueryTicket`] stamped with a request generation, and applies the
//! response. Only the response to the latest ticket is applied; older ones
//! come back as [`LoadOutcome::Stale`] and change nothing.
//!
//! A failed query is not rolled back: the state keeps the change that
//! triggered it, the window becomes empty and the body shows the empty-state
//! row.

use horizon_grid_core::logging::targets;

use crate::column::ColumnModel;
use crate::error::{GridError, QueryError, Result};
use crate::query::{Combinator, FilterPredicate, Query, QueryResult, SearchQuery, SortDescriptor, SortDirection};
use crate::row::{AggregateRowDef, GridContext, RowModel, RowModelGenerator};
use crate::settings::{GridSettings, SearchSettings};
use crate::value::Record;

/// What the user asked for, plus the window returned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Current page, 1-based.
    pub current_page: usize,
    /// Records per page.
    pub page_size: usize,
    /// Whether the window is paged.
    pub paging_enabled: bool,
    /// Sort keys, primary first.
    pub sort: Vec<SortDescriptor>,
    /// Filter predicates.
    pub filters: Vec<FilterPredicate>,
    /// Search text; empty for none.
    pub search: String,
    /// Records of the current window.
    pub result: Vec<Record>,
    /// Matching records before paging, as of the last successful load. A
    /// failed load leaves it unchanged so the page range stays usable.
    pub total_count: usize,
}

impl ViewState {
    /// Initial state from the paging settings.
    pub fn new(settings: &GridSettings) -> Self {
        Self {
            current_page: settings.page.current_page.max(1),
            page_size: settings.page.page_size.max(1),
            paging_enabled: settings.page.enabled,
            sort: Vec::new(),
            filters: Vec::new(),
            search: String::new(),
            result: Vec::new(),
            total_count: 0,
        }
    }

    /// Number of pages for the last known count. Never less than one.
    pub fn page_count(&self) -> usize {
        if !self.paging_enabled {
            return 1;
        }
        self.total_count.div_ceil(self.page_size).max(1)
    }

    /// Absolute index of the first record of the window.
    pub fn start_index(&self) -> usize {
        if self.paging_enabled {
            (self.current_page - 1) * self.page_size
        } else {
            0
        }
    }

    /// The query for this state.
    ///
    /// Search runs over the displayed leaf columns that have a field.
    pub fn to_query(&self, columns: &ColumnModel, search: &SearchSettings) -> Query {
        let search = (!self.search.is_empty()).then(|| {
            let fields = columns
                .leaf_columns()
                .into_iter()
                .filter_map(|c| c.field().map(str::to_string))
                .collect();
            SearchQuery {
                operator: search.operator,
                ignore_case: search.ignore_case,
                ..SearchQuery::new(self.search.clone(), fields)
            }
        });
        Query {
            skip: self.start_index(),
            take: self.paging_enabled.then_some(self.page_size),
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            search,
            requires_count: true,
        }
    }
}

/// A query handed out by [`ViewStateController::issue`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTicket {
    /// Request generation; pass it back to [`ViewStateController::apply`].
    pub generation: u64,
    /// The query to run.
    pub query: Query,
}

/// What became of a view change.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The response was applied.
    Loaded {
        /// Records in the window.
        rows: usize,
        /// Matching records before paging.
        total_count: usize,
    },
    /// The query failed; the window is empty.
    Failed(QueryError),
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
    /// The change was vetoed before any query was issued.
    Cancelled,
}

impl LoadOutcome {
    /// Returns `true` for [`LoadOutcome::Loaded`].
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Owns the view state and the row model derived from it.
#[derive(Debug, Clone)]
pub struct ViewStateController {
    state: ViewState,
    generation: u64,
    in_flight: usize,
    generator: RowModelGenerator,
    ctx: GridContext,
    aggregates: Vec<AggregateRowDef>,
    row_model: RowModel,
}

impl ViewStateController {
    /// A controller for a grid with the given id prefix.
    pub fn new(settings: &GridSettings, ctx: GridContext, aggregates: Vec<AggregateRowDef>) -> Self {
        Self {
            state: ViewState::new(settings),
            generation: 0,
            in_flight: 0,
            generator: RowModelGenerator::new(settings.alternate_rows),
            ctx,
            aggregates,
            row_model: RowModel::default(),
        }
    }

    /// The view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Records of the current window.
    pub fn records(&self) -> &[Record] {
        &self.state.result
    }

    /// The current row model.
    pub fn row_model(&self) -> &RowModel {
        &self.row_model
    }

    pub(crate) fn row_model_mut(&mut self) -> &mut RowModel {
        &mut self.row_model
    }

    /// Generation of the latest issued request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the ticket with this generation is still the latest.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Move to `page`.
    pub fn set_page(&mut self, page: usize) -> Result<()> {
        let page_count = self.state.page_count();
        if page == 0 || page > page_count {
            return Err(GridError::PageOutOfRange { page, page_count });
        }
        tracing::debug!(target: targets::VIEW, from = self.state.current_page, to = page, "page changed");
        self.state.current_page = page;
        Ok(())
    }

    /// Sort by `field`.
    ///
    /// With `multi` the key is appended, or replaces an existing key on the
    /// same field in place; without it the key replaces all others.
    pub fn sort_by_column(&mut self, field: &str, direction: SortDirection, multi: bool) {
        let descriptor = SortDescriptor::new(field, direction);
        if !multi {
            self.state.sort = vec![descriptor];
        } else if let Some(existing) = self.state.sort.iter_mut().find(|s| s.field == field) {
            *existing = descriptor;
        } else {
            self.state.sort.push(descriptor);
        }
        tracing::debug!(target: targets::VIEW, sort = ?self.state.sort, "sort changed");
    }

    /// Drop the sort key on `field`. Returns `false` if there was none.
    pub fn remove_sort_column(&mut self, field: &str) -> bool {
        let before = self.state.sort.len();
        self.state.sort.retain(|s| s.field != field);
        before != self.state.sort.len()
    }

    /// Drop every sort key.
    pub fn clear_sort(&mut self) {
        self.state.sort.clear();
    }

    /// Add a filter predicate and go back to the first page.
    ///
    /// Without an explicit combinator the predicate replaces any existing
    /// predicates on the same field. With one it is added next to them.
    pub fn filter_by_column(&mut self, predicate: FilterPredicate, combinator: Option<Combinator>) {
        match combinator {
            Some(combinator) => self.state.filters.push(predicate.with_combinator(combinator)),
            None => {
                self.state.filters.retain(|f| f.field != predicate.field);
                self.state.filters.push(predicate);
            }
        }
        self.state.current_page = 1;
        tracing::debug!(target: targets::VIEW, filters = self.state.filters.len(), "filter changed");
    }

    /// Drop the predicates on `field`. Returns `false` if there were none.
    pub fn remove_filtered_column(&mut self, field: &str) -> bool {
        let before = self.state.filters.len();
        self.state.filters.retain(|f| f.field != field);
        let removed = before != self.state.filters.len();
        if removed {
            self.state.current_page = 1;
        }
        removed
    }

    /// Drop every filter predicate.
    pub fn clear_filter(&mut self) {
        self.state.filters.clear();
        self.state.current_page = 1;
    }

    /// Set the search text and go back to the first page.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.state.search = text.into();
        self.state.current_page = 1;
        tracing::debug!(target: targets::VIEW, search = %self.state.search, "search changed");
    }

    /// Stamp a new request for the current state.
    pub fn issue(&mut self, columns: &ColumnModel, search: &SearchSettings) -> QueryTicket {
        self.generation += 1;
        self.in_flight += 1;
        let query = self.state.to_query(columns, search);
        tracing::debug!(
            target: targets::QUERY,
            generation = self.generation,
            skip = query.skip,
            take = ?query.take,
            sort = query.sort.len(),
            filters = query.filters.len(),
            "query issued"
        );
        QueryTicket {
            generation: self.generation,
            query,
        }
    }

    /// Apply the response to the ticket with `generation`.
    pub fn apply(
        &mut self,
        generation: u64,
        response: std::result::Result<QueryResult, QueryError>,
        columns: &ColumnModel,
    ) -> LoadOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        if !self.is_current(generation) {
            tracing::warn!(
                target: targets::QUERY,
                generation,
                latest = self.generation,
                "stale query response discarded"
            );
            return LoadOutcome::Stale;
        }

        let outcome = match response {
            Ok(QueryResult { result, count }) => {
                self.state.total_count = count;
                self.state.result = result;
                LoadOutcome::Loaded {
                    rows: self.state.result.len(),
                    total_count: count,
                }
            }
            Err(err) => {
                tracing::warn!(target: targets::QUERY, generation, %err, "query failed");
                self.state.result.clear();
                LoadOutcome::Failed(err)
            }
        };
        self.regenerate(columns);
        outcome
    }

    /// Rebuild the row model from the current window.
    pub fn regenerate(&mut self, columns: &ColumnModel) -> &RowModel {
        self.row_model = self.generator.generate(
            &mut self.ctx,
            &self.state.result,
            self.state.start_index(),
            columns,
            &self.aggregates,
        );
        &self.row_model
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.state.result
    }
}
