//! Header depth and span arithmetic over the column tree.
//!
//! Only displayed columns count: a hidden column, or a group whose children
//! are all hidden, contributes neither depth nor span.

use super::{Column, ColumnKind};

/// Number of header rows needed for `columns`.
///
/// A leaf-only set needs one row; every level of grouping adds one. An empty
/// set needs none.
pub fn compute_depth(columns: &[Column]) -> usize {
    columns
        .iter()
        .filter(|c| c.is_displayed())
        .map(|c| match &c.kind {
            ColumnKind::Leaf(_) => 1,
            ColumnKind::Group(children) => 1 + compute_depth(children),
        })
        .max()
        .unwrap_or(0)
}

/// Number of displayed leaf columns under `column` (1 for a displayed leaf).
pub fn compute_span(column: &Column) -> usize {
    if !column.is_displayed() {
        return 0;
    }
    match &column.kind {
        ColumnKind::Leaf(_) => 1,
        ColumnKind::Group(children) => children.iter().map(compute_span).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnDef, ColumnResolver};

    fn resolve(defs: Vec<ColumnDef>) -> Vec<Column> {
        ColumnResolver::default().resolve(defs).unwrap().columns().to_vec()
    }

    fn tree() -> Vec<Column> {
        resolve(vec![
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
    }

    #[test]
    fn test_depth() {
        assert_eq!(compute_depth(&[]), 0);
        assert_eq!(compute_depth(&resolve(vec![ColumnDef::new("A"), ColumnDef::new("B")])), 1);
        assert_eq!(compute_depth(&tree()), 3);
    }

    #[test]
    fn test_spans_sum_to_leaf_count() {
        let columns = tree();
        let spans: Vec<usize> = columns.iter().map(compute_span).collect();
        assert_eq!(spans, [1, 3, 1]);

        let details = &columns[1];
        let child_spans: usize = details.children().iter().map(compute_span).sum();
        assert_eq!(child_spans, compute_span(details));
    }

    #[test]
    fn test_hidden_columns_do_not_count() {
        let columns = resolve(vec![
            ColumnDef::new("OrderID"),
            ColumnDef::group(
                "Ship",
                vec![
                    ColumnDef::new("ShipCity").hidden(),
                    ColumnDef::new("ShipCountry").hidden(),
                ],
            ),
            ColumnDef::group("Customer", vec![ColumnDef::new("CustomerID"), ColumnDef::new("Name").hidden()]),
        ]);
        assert_eq!(compute_span(&columns[1]), 0);
        assert_eq!(compute_span(&columns[2]), 1);
        assert_eq!(compute_depth(&columns), 2);
    }
}
