//! Spanning header layout.
//!
//! A group column sits on its own level and spans its displayed leaves.
//! A leaf column sits on its own level and spans down to the last header
//! row, so every leaf header ends on the row just above the body.
//!
//! ```text
//! depth = 3
//! +---------+-----------------------------+---------+
//! |         |        Order Details        |         |
//! |         +----------+------------------+         |
//! | OrderID |          |       Ship       | Freight |
//! |         |OrderDate +---------+--------+         |
//! |         |          |ShipCity |Country |         |
//! +---------+----------+---------+--------+---------+
//! ```

use crate::column::{Column, ColumnKind, ColumnModel, compute_span};

use super::{mark_edges, Cell, CellKind, GridContext, Row, RowKind};

/// Build the header rows for the displayed columns.
///
/// Returns `model.depth()` rows. Within every row the column spans of
/// the cells that start there, plus the columns covered by leaf cells
/// reaching down from above, add up to the number of displayed leaves.
pub fn generate_header_rows(ctx: &mut GridContext, model: &ColumnModel) -> Vec<Row> {
    let depth = model.depth();
    let mut bands: Vec<Vec<Cell>> = vec![Vec::new(); depth];
    for column in model.display_roots() {
        place(column, 0, depth, &mut bands);
    }

    bands
        .into_iter()
        .map(|mut cells| {
            mark_edges(&mut cells);
            Row::new(ctx.next_row_uid(), RowKind::Header, cells)
        })
        .collect()
}

fn place(column: &Column, level: usize, depth: usize, bands: &mut [Vec<Cell>]) {
    if !column.is_displayed() {
        return;
    }
    match &column.kind {
        ColumnKind::Leaf(leaf) => {
            let mut cell = Cell::new(CellKind::Header, Some(column.uid.clone()));
            cell.row_span = depth - level;
            cell.header_text = Some(column.header_text.clone());
            cell.is_template = leaf.template.is_some();
            cell.text_align = leaf.text_align;
            bands[level].push(cell);
        }
        ColumnKind::Group(children) => {
            let mut cell = Cell::new(CellKind::StackedHeader, Some(column.uid.clone()));
            cell.col_span = compute_span(column);
            cell.header_text = Some(column.header_text.clone());
            bands[level].push(cell);
            for child in children {
                place(child, level + 1, depth, bands);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnDef, ColumnResolver, Freeze};

    fn model() -> ColumnModel {
        ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("OrderID"),
                ColumnDef::group(
                    "Order Details",
                    vec![
                        ColumnDef::new("OrderDate"),
                        ColumnDef::group(
                            "Ship",
                            vec![ColumnDef::new("ShipCity"), ColumnDef::new("ShipCountry")],
                        ),
                    ],
                ),
                ColumnDef::new("Freight"),
            ])
            .unwrap()
    }

    fn texts(row: &Row) -> Vec<(&str, usize, usize)> {
        row.cells
            .iter()
            .map(|c| (c.header_text.as_deref().unwrap_or(""), c.col_span, c.row_span))
            .collect()
    }

    #[test]
    fn test_stacked_layout() {
        let mut ctx = GridContext::new("grid");
        let rows = generate_header_rows(&mut ctx, &model());
        assert_eq!(rows.len(), 3);
        assert_eq!(
            texts(&rows[0]),
            [("OrderID", 1, 3), ("Order Details", 3, 1), ("Freight", 1, 3)]
        );
        assert_eq!(texts(&rows[1]), [("OrderDate", 1, 2), ("Ship", 2, 1)]);
        assert_eq!(texts(&rows[2]), [("ShipCity", 1, 1), ("ShipCountry", 1, 1)]);
        assert!(rows.iter().all(|r| r.kind == RowKind::Header));
    }

    #[test]
    fn test_header_covers_every_leaf_once() {
        let model = model();
        let mut ctx = GridContext::new("grid");
        let rows = generate_header_rows(&mut ctx, &model);

        // Every band, counting leaves hanging down from above, spans all leaves.
        let depth = rows.len();
        let leaves = model.leaf_columns().len();
        for level in 0..depth {
            let mut covered = 0;
            for (upper, row) in rows.iter().enumerate().take(level + 1) {
                for cell in &row.cells {
                    let reaches = upper + cell.row_span > level;
                    let is_leaf_or_here = cell.kind == CellKind::Header || upper == level;
                    if reaches && is_leaf_or_here {
                        covered += cell.col_span;
                    }
                }
            }
            assert_eq!(covered, leaves, "band {level}");
        }
    }

    #[test]
    fn test_edge_markers_and_cell_kinds() {
        let mut ctx = GridContext::new("grid");
        let rows = generate_header_rows(&mut ctx, &model());
        let top = &rows[0];
        assert!(top.cells[0].is_first && !top.cells[0].is_last);
        assert!(top.cells[2].is_last);
        assert_eq!(top.cells[1].kind, CellKind::StackedHeader);
        assert_eq!(top.cells[0].kind, CellKind::Header);
        assert!(rows.iter().flat_map(|r| &r.cells).all(|c| c.value.is_null()));
    }

    #[test]
    fn test_flat_header_with_frozen_column() {
        let model = ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("A"),
                ColumnDef::new("B").freeze(Freeze::Left),
                ColumnDef::new("C").hidden(),
            ])
            .unwrap();
        let mut ctx = GridContext::new("grid");
        let rows = generate_header_rows(&mut ctx, &model);
        assert_eq!(rows.len(), 1);
        assert_eq!(texts(&rows[0]), [("B", 1, 1), ("A", 1, 1)]);
    }
}
