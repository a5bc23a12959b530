//! Selection behaviour across view changes, one test per policy.

use std::sync::Arc;

use horizon_grid::column::ColumnDef;
use horizon_grid::query::{LocalDataSource, SortDirection};
use horizon_grid::selection::{SelectionMode, SelectionPolicy};
use horizon_grid::{Grid, GridSettings, Record, Value};
use parking_lot::Mutex;

async fn grid(policy: SelectionPolicy) -> Grid {
    let records = (1..=6)
        .map(|id| Record::new().with("OrderID", id).with("Freight", f64::from(id)))
        .collect();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(vec![ColumnDef::new("OrderID").primary_key(true), ColumnDef::new("Freight")])
        .settings(
            GridSettings::default()
                .with_page_size(4)
                .with_selection(SelectionMode::Multiple, policy),
        )
        .build()
        .unwrap();
    grid.refresh().await;
    grid
}

fn selected_ids(grid: &Grid) -> Vec<Option<i64>> {
    grid.get_selected_records()
        .iter()
        .map(|r| r.as_ref().and_then(|r| r.get("OrderID")).and_then(Value::as_int))
        .collect()
}

#[tokio::test]
async fn test_clear_policy() {
    let grid = grid(SelectionPolicy::Clear).await;
    let deselected = Arc::new(Mutex::new(Vec::new()));
    let log = deselected.clone();
    grid.signals().row_deselected.connect(move |args| log.lock().push(args.index));

    grid.select_rows(&[0, 2]).unwrap();
    assert_eq!(selected_ids(&grid), [Some(1), Some(3)]);
    grid.sort_by_column("Freight", SortDirection::Descending, false).await.unwrap();
    assert!(grid.get_selected_row_indexes().is_empty());
    assert_eq!(deselected.lock().as_slice(), [0, 2]);
}

#[tokio::test]
async fn test_remap_by_primary_key_policy() {
    let grid = grid(SelectionPolicy::RemapByPrimaryKey).await;
    grid.select_rows(&[2, 3]).unwrap();
    assert_eq!(selected_ids(&grid), [Some(3), Some(4)]);

    // Descending: 6 5 4 3 on the first page.
    grid.sort_by_column("Freight", SortDirection::Descending, false).await.unwrap();
    assert_eq!(grid.get_selected_row_indexes(), [3, 2]);
    assert_eq!(selected_ids(&grid), [Some(3), Some(4)]);

    let rows = grid.row_model();
    let flags: Vec<_> = rows.data_rows().map(|r| r.is_selected).collect();
    assert_eq!(flags, [false, false, true, true]);

    // Page two holds 2 and 1; neither was selected.
    grid.go_to_page(2).await.unwrap();
    assert!(grid.get_selected_row_indexes().is_empty());
}

#[tokio::test]
async fn test_persist_index_policy() {
    let grid = grid(SelectionPolicy::PersistIndex).await;
    grid.select_rows(&[0, 3]).unwrap();
    grid.go_to_page(2).await.unwrap();

    // Page two has two records, so position 3 resolves to nothing.
    assert_eq!(grid.get_selected_row_indexes(), [0, 3]);
    assert_eq!(selected_ids(&grid), [Some(5), None]);
}

#[tokio::test]
async fn test_select_and_toggle() {
    let grid = grid(SelectionPolicy::Clear).await;
    let selected = Arc::new(Mutex::new(Vec::new()));
    let log = selected.clone();
    grid.signals().row_selected.connect(move |args| {
        log.lock().push(args.record.as_ref().and_then(|r| r.get("OrderID").and_then(Value::as_int)));
    });

    grid.select_row(1, false).unwrap();
    grid.select_row(3, true).unwrap();
    assert_eq!(grid.get_selected_row_indexes(), [1, 3]);
    grid.select_row(1, true).unwrap();
    assert_eq!(grid.get_selected_row_indexes(), [3]);
    grid.select_row_by_range(0, 2).unwrap();
    assert_eq!(grid.get_selected_row_indexes(), [0, 1, 2]);
    assert!(grid.select_row(9, false).is_err());

    let cleared = Arc::new(Mutex::new(Vec::new()));
    let log = cleared.clone();
    grid.signals().row_deselected.connect(move |args| log.lock().push(args.index));
    grid.clear_selection();
    assert!(grid.get_selected_records().is_empty());
    assert_eq!(cleared.lock().as_slice(), [0, 1, 2]);
    assert!(grid.row_model().data_rows().all(|row| !row.is_selected));

    assert_eq!(&selected.lock()[..2], [Some(2), Some(4)]);
}
