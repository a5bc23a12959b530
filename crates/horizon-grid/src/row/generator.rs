//! Body row and cell generation.

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::{span_names, targets};

use crate::column::{Column, ColumnModel};
use crate::value::Record;

use super::{
    generate_header_rows, mark_edges, AggregateRowDef, Cell, CellKind, Row, RowKind, RowModel,
};

/// Per-grid generation context.
///
/// Holds the row id counter so that two grids never share id sequences and
/// tests see deterministic ids.
#[derive(Debug, Clone)]
pub struct GridContext {
    id: String,
    next_row: u64,
}

impl GridContext {
    /// A context whose row ids are prefixed with `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            next_row: 0,
        }
    }

    /// The grid id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mint the next row id, e.g. `grid-row7`.
    pub fn next_row_uid(&mut self) -> String {
        let uid = format!("{}-row{}", self.id, self.next_row);
        self.next_row += 1;
        uid
    }
}

/// Turns a view window into rows and cells.
#[derive(Debug, Clone, Default)]
pub struct RowModelGenerator {
    alternate_rows: bool,
}

impl RowModelGenerator {
    /// A generator. `alternate_rows` enables the odd-row flag.
    pub fn new(alternate_rows: bool) -> Self {
        Self { alternate_rows }
    }

    /// Build the complete model: header, body and aggregate rows.
    ///
    /// An empty window produces a single empty-state body row.
    pub fn generate(
        &self,
        ctx: &mut GridContext,
        records: &[Record],
        start_index: usize,
        columns: &ColumnModel,
        aggregates: &[AggregateRowDef],
    ) -> RowModel {
        let _perf = PerfSpan::new(span_names::REGENERATE);

        let header_rows = generate_header_rows(ctx, columns);
        let rows = if records.is_empty() {
            vec![self.generate_empty_row(ctx, columns)]
        } else {
            self.generate_rows(ctx, records, start_index, columns)
        };
        let aggregate_rows = aggregates
            .iter()
            .map(|def| Row::new(ctx.next_row_uid(), RowKind::Aggregate, def.cells(columns, records)))
            .collect();

        tracing::debug!(
            target: targets::VIEW,
            header_rows = header_rows.len(),
            rows = records.len(),
            start_index,
            "row model regenerated"
        );

        RowModel {
            header_rows,
            rows,
            aggregate_rows,
        }
    }

    /// One data row per record, indexed from `start_index`.
    pub fn generate_rows(
        &self,
        ctx: &mut GridContext,
        records: &[Record],
        start_index: usize,
        columns: &ColumnModel,
    ) -> Vec<Row> {
        let leaves = columns.leaf_columns();
        records
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let index = start_index + position;
                let mut row = Row::new(
                    ctx.next_row_uid(),
                    RowKind::Data,
                    self.generate_cells(record, &leaves),
                );
                row.index = Some(index);
                row.is_alt_row = self.alternate_rows && index % 2 == 1;
                row.data = Some(record.clone());
                row
            })
            .collect()
    }

    /// One cell per leaf column, in the order given.
    pub fn generate_cells(&self, record: &Record, leaves: &[&Column]) -> Vec<Cell> {
        let mut cells: Vec<Cell> = leaves
            .iter()
            .map(|column| {
                let Some(leaf) = column.leaf() else {
                    return Cell::new(CellKind::Empty, Some(column.uid.clone()));
                };
                let is_data = leaf.field.is_some() || leaf.template.is_some();
                let kind = if is_data { CellKind::Data } else { CellKind::Empty };

                let mut cell = Cell::new(kind, Some(column.uid.clone()));
                cell.is_template = leaf.template.is_some();
                cell.renderer = leaf.renderer();
                cell.text_align = leaf.text_align;
                if is_data {
                    cell.value = leaf.value_of(record);
                    cell.display_text = leaf.display_text(record);
                    cell.foreign_key_data = leaf
                        .foreign_key
                        .as_ref()
                        .and_then(|fk| fk.lookup(&cell.value))
                        .cloned();
                }
                cell
            })
            .collect();
        mark_edges(&mut cells);
        cells
    }

    /// The placeholder row: one cell spanning every displayed leaf.
    pub fn generate_empty_row(&self, ctx: &mut GridContext, columns: &ColumnModel) -> Row {
        let mut cell = Cell::new(CellKind::Empty, None);
        cell.col_span = columns.leaf_columns().len().max(1);
        cell.display_text = "No records to display".to_string();
        cell.is_first = true;
        cell.is_last = true;
        Row::new(ctx.next_row_uid(), RowKind::Empty, vec![cell])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::column::{ColumnDef, ColumnResolver, ColumnType, ForeignKey, Freeze, Template};
    use crate::row::{AggregateColumn, AggregateType};
    use crate::value::Value;

    fn columns() -> ColumnModel {
        ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("OrderID").primary_key(true),
                ColumnDef::new("Freight")
                    .column_type(ColumnType::Number)
                    .format("N2")
                    .freeze(Freeze::Right),
                ColumnDef::new("ShipCity"),
            ])
            .unwrap()
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::new()
                    .with("OrderID", 10248 + i as i64)
                    .with("Freight", i as f64 * 1.5)
                    .with("ShipCity", format!("City {i}"))
            })
            .collect()
    }

    #[test]
    fn test_rows_are_indexed_from_start() {
        let mut ctx = GridContext::new("grid");
        let rows = RowModelGenerator::new(true).generate_rows(&mut ctx, &records(7), 8, &columns());

        assert_eq!(rows.len(), 7);
        let indexes: Vec<usize> = rows.iter().filter_map(|r| r.index).collect();
        assert_eq!(indexes, (8..15).collect::<Vec<_>>());
        let uids: HashSet<&str> = rows.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids.len(), 7);
        assert!(!rows[0].is_alt_row);
        assert!(rows[1].is_alt_row);
    }

    #[test]
    fn test_alternate_rows_can_be_disabled() {
        let mut ctx = GridContext::new("grid");
        let rows = RowModelGenerator::new(false).generate_rows(&mut ctx, &records(3), 0, &columns());
        assert!(rows.iter().all(|r| !r.is_alt_row));
    }

    #[test]
    fn test_cells_follow_display_order() {
        let model = columns();
        let mut ctx = GridContext::new("grid");
        let rows = RowModelGenerator::default().generate_rows(&mut ctx, &records(2), 0, &model);
        let row = &rows[1];

        assert_eq!(row.cells.len(), 3);
        let order: Vec<_> = row.cells.iter().filter_map(|c| c.column_uid.as_deref()).collect();
        assert_eq!(order, ["OrderID", "ShipCity", "Freight"]);
        assert_eq!(row.cell("Freight").unwrap().display_text, "1.50");
        assert_eq!(row.cell("OrderID").unwrap().value, Value::Int(10249));
        assert!(row.cells.iter().all(|c| c.kind == CellKind::Data));
    }

    #[test]
    fn test_contexts_do_not_share_ids() {
        let mut a = GridContext::new("a");
        let mut b = GridContext::new("b");
        assert_eq!(a.next_row_uid(), "a-row0");
        assert_eq!(a.next_row_uid(), "a-row1");
        assert_eq!(b.next_row_uid(), "b-row0");
    }

    #[test]
    fn test_foreign_key_and_template_cells() {
        let model = ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("EmployeeID").foreign_key(ForeignKey::new(
                    "EmployeeID",
                    "LastName",
                    vec![Record::new().with("EmployeeID", 5).with("LastName", "Buchanan")],
                )),
                ColumnDef::templated("Link", Template::new(|_| "open".to_string())),
            ])
            .unwrap();
        let leaves = model.leaf_columns();
        let cells = RowModelGenerator::default()
            .generate_cells(&Record::new().with("EmployeeID", 5), &leaves);

        assert_eq!(cells[0].display_text, "Buchanan");
        assert_eq!(
            cells[0].foreign_key_data.as_ref().and_then(|r| r.get("LastName")),
            Some(&Value::from("Buchanan"))
        );
        assert!(cells[1].is_template);
        assert_eq!(cells[1].kind, CellKind::Data);
        assert_eq!(cells[1].display_text, "open");
    }

    #[test]
    fn test_empty_window_renders_placeholder() {
        let mut ctx = GridContext::new("grid");
        let model = RowModelGenerator::default().generate(&mut ctx, &[], 0, &columns(), &[]);
        assert!(model.is_empty_state());
        assert_eq!(model.rows[0].cells[0].col_span, 3);
        assert_eq!(model.header_rows.len(), 1);
    }

    #[test]
    fn test_full_model_with_aggregates() {
        let mut ctx = GridContext::new("grid");
        let aggregates = [AggregateRowDef::new(vec![AggregateColumn::new(
            "Freight",
            AggregateType::Max,
        )])];
        let model =
            RowModelGenerator::default().generate(&mut ctx, &records(3), 0, &columns(), &aggregates);
        assert_eq!(model.data_rows().count(), 3);
        assert_eq!(model.aggregate_rows.len(), 1);
        let max = model.aggregate_rows[0].cell("Freight").unwrap();
        assert_eq!(max.value, Value::Float(3.0));
        assert_eq!(max.display_text, "3.00");
    }
}
