//! Row and cell model handed to the presentation layer.
//!
//! A [`RowModel`] is regenerated as a whole after every view change. Header
//! rows come from the column tree, body rows from the current view window,
//! and aggregate rows from the configured footer aggregates.

mod aggregate;
mod generator;
mod header;

use crate::column::{CellRenderer, TextAlign};
use crate::value::{Record, Value};

pub use aggregate::{AggregateColumn, AggregateRowDef, AggregateType};
pub use generator::{GridContext, RowModelGenerator};
pub use header::generate_header_rows;

/// What a row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// One band of the header.
    Header,
    /// One record of the view window.
    Data,
    /// A footer aggregate row.
    Aggregate,
    /// The placeholder shown when the view is empty.
    Empty,
}

/// What a cell represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Header of a leaf column.
    Header,
    /// Header of a group column.
    StackedHeader,
    /// A record value for one leaf column.
    Data,
    /// A footer aggregate value.
    Aggregate,
    /// The empty-state placeholder.
    Empty,
}

/// One cell of a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Id of the owning column. `None` only for the empty-state cell.
    pub column_uid: Option<String>,
    /// Cell kind.
    pub kind: CellKind,
    /// Number of leaf columns covered.
    pub col_span: usize,
    /// Number of header rows covered.
    pub row_span: usize,
    /// Visibility flag.
    pub visible: bool,
    /// Whether the column renders through a template.
    pub is_template: bool,
    /// First cell of its row.
    pub is_first: bool,
    /// Last cell of its row.
    pub is_last: bool,
    /// Header text (header cells only).
    pub header_text: Option<String>,
    /// Raw value (data and aggregate cells only).
    pub value: Value,
    /// Formatted text for display.
    pub display_text: String,
    /// Foreign record matched by a foreign-key column.
    pub foreign_key_data: Option<Record>,
    /// Renderer strategy.
    pub renderer: CellRenderer,
    /// Alignment.
    pub text_align: TextAlign,
}

impl Cell {
    pub(crate) fn new(kind: CellKind, column_uid: Option<String>) -> Self {
        Self {
            column_uid,
            kind,
            col_span: 1,
            row_span: 1,
            visible: true,
            is_template: false,
            is_first: false,
            is_last: false,
            header_text: None,
            value: Value::Null,
            display_text: String::new(),
            foreign_key_data: None,
            renderer: CellRenderer::Text,
            text_align: TextAlign::Left,
        }
    }
}

/// One row of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Id minted by the grid context.
    pub uid: String,
    /// Row kind.
    pub kind: RowKind,
    /// Absolute position in the sorted and filtered set (data rows only).
    pub index: Option<usize>,
    /// Alternating-row flag.
    pub is_alt_row: bool,
    /// Selection flag.
    pub is_selected: bool,
    /// Cells in display order.
    pub cells: Vec<Cell>,
    /// The record behind a data row.
    pub data: Option<Record>,
}

impl Row {
    pub(crate) fn new(uid: String, kind: RowKind, cells: Vec<Cell>) -> Self {
        Self {
            uid,
            kind,
            index: None,
            is_alt_row: false,
            is_selected: false,
            cells,
            data: None,
        }
    }

    /// The cell owned by a column id.
    pub fn cell(&self, column_uid: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|c| c.column_uid.as_deref() == Some(column_uid))
    }
}

pub(crate) fn mark_edges(cells: &mut [Cell]) {
    let len = cells.len();
    for (i, cell) in cells.iter_mut().enumerate() {
        cell.is_first = i == 0;
        cell.is_last = i + 1 == len;
    }
}

/// The complete presentation model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowModel {
    /// Header bands, outermost group first.
    pub header_rows: Vec<Row>,
    /// Body rows: data rows, or a single empty-state row.
    pub rows: Vec<Row>,
    /// Footer aggregate rows.
    pub aggregate_rows: Vec<Row>,
}

impl RowModel {
    /// Data rows only.
    pub fn data_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.kind == RowKind::Data)
    }

    /// Returns `true` when the body shows the empty-state row.
    pub fn is_empty_state(&self) -> bool {
        matches!(self.rows.as_slice(), [row] if row.kind == RowKind::Empty)
    }
}
