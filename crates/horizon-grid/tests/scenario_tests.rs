//! End-to-end grid scenarios over the in-memory data source.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_grid::column::ColumnDef;
use horizon_grid::edit::{ConfirmPrompt, ValidationRule};
use horizon_grid::query::{FilterOperator, LocalDataSource, SortDirection};
use horizon_grid::{DeleteOutcome, Grid, GridSettings, LoadOutcome, Record, SaveOutcome, Value};

fn order(id: i64, status: &str, freight: f64) -> Record {
    Record::new()
        .with("OrderID", id)
        .with("CustomerID", format!("C{id}"))
        .with("Status", status)
        .with("Freight", freight)
}

fn order_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("OrderID").primary_key(true),
        ColumnDef::new("CustomerID").rule(ValidationRule::required()),
        ColumnDef::new("Status"),
        ColumnDef::new("Freight"),
    ]
}

fn ids(grid: &Grid) -> Vec<i64> {
    grid.get_current_view_records()
        .iter()
        .filter_map(|r| r.get("OrderID").and_then(Value::as_int))
        .collect()
}

#[tokio::test]
async fn test_second_page_of_fifteen() {
    let records = (0..15).map(|i| order(10248 + i, "Shipped", 1.0)).collect();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(order_columns())
        .settings(GridSettings::default().with_page_size(8))
        .build()
        .unwrap();

    assert_eq!(grid.refresh().await, LoadOutcome::Loaded { rows: 8, total_count: 15 });
    assert_eq!(grid.page_count(), 2);

    let outcome = grid.go_to_page(2).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { rows: 7, total_count: 15 });
    assert_eq!(grid.get_current_view_records().len(), 7);

    let indexes: Vec<_> = grid.row_model().data_rows().filter_map(|r| r.index).collect();
    assert_eq!(indexes, (8..15).collect::<Vec<_>>());
    assert!(grid.go_to_page(3).await.is_err());
}

#[tokio::test]
async fn test_sort_freight_descending() {
    let records = vec![order(1, "Shipped", 10.0), order(2, "Shipped", 50.0), order(3, "Shipped", 30.0)];
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(order_columns())
        .build()
        .unwrap();
    grid.refresh().await;

    grid.sort_by_column("Freight", SortDirection::Descending, false)
        .await
        .unwrap();
    let freight: Vec<_> = grid
        .get_current_view_records()
        .iter()
        .filter_map(|r| r.get("Freight").and_then(Value::as_float))
        .collect();
    assert_eq!(freight, [50.0, 30.0, 10.0]);
}

#[tokio::test]
async fn test_filter_pending_status() {
    let records = vec![
        order(1, "Pending", 1.0),
        order(2, "Shipped", 1.0),
        order(3, "Pending", 1.0),
        order(4, "Delivered", 1.0),
        order(5, "Shipped", 1.0),
    ];
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(order_columns())
        .build()
        .unwrap();
    grid.refresh().await;

    grid.filter_by_column("Status", FilterOperator::Equal, "Pending", None, None)
        .await
        .unwrap();
    let view = grid.get_current_view_records();
    assert_eq!(view.len(), 2);
    assert!(view.iter().all(|r| r.get("Status") == Some(&Value::from("Pending"))));
    assert_eq!(grid.total_count(), 2);

    grid.clear_filter().await.unwrap();
    assert_eq!(grid.get_current_view_records().len(), 5);
}

#[tokio::test]
async fn test_add_with_blank_required_field_is_rejected() {
    let records = (1..=3).map(|i| order(i, "Shipped", 1.0)).collect();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(order_columns())
        .settings(GridSettings::default().editable())
        .build()
        .unwrap();
    grid.refresh().await;
    let before = grid.get_current_view_records();

    assert!(grid.begin_add().unwrap());
    let SaveOutcome::Invalid(errors) = grid.save().await.unwrap() else {
        panic!("save should be rejected");
    };
    assert!(errors.contains("CustomerID"));
    assert!(grid.edit_session().is_some());
    assert_eq!(grid.get_current_view_records(), before);
}

#[tokio::test]
async fn test_declined_delete_changes_nothing() {
    let records = (1..=3).map(|i| order(i, "Shipped", 1.0)).collect();
    let source = LocalDataSource::new(records);
    let prompts = Arc::new(AtomicUsize::new(0));
    let seen = prompts.clone();

    let mut settings = GridSettings::default().editable();
    settings.edit.show_delete_confirm_dialog = true;
    let grid = Grid::builder(source.clone())
        .columns(order_columns())
        .settings(settings)
        .confirmation_gate(move |prompt: &ConfirmPrompt| {
            assert!(matches!(prompt, ConfirmPrompt::DeleteRecord { .. }));
            seen.fetch_add(1, Ordering::SeqCst);
            false
        })
        .build()
        .unwrap();
    grid.refresh().await;
    let before = grid.get_current_view_records();

    let outcome = grid.delete_record(Some(Value::Int(2))).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(prompts.load(Ordering::SeqCst), 1);
    assert_eq!(grid.get_current_view_records(), before);
    assert_eq!(source.len(), 3);
}

#[tokio::test]
async fn test_sort_twice_matches_sort_once() {
    let records = vec![
        order(1, "Pending", 30.0),
        order(2, "Shipped", 10.0),
        order(3, "Pending", 30.0),
        order(4, "Shipped", 20.0),
        order(5, "Pending", 10.0),
    ];
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(order_columns())
        .build()
        .unwrap();
    grid.refresh().await;

    grid.sort_by_column("Status", SortDirection::Ascending, false).await.unwrap();
    grid.sort_by_column("Freight", SortDirection::Descending, true).await.unwrap();
    let once = ids(&grid);
    assert_eq!(once, [1, 3, 5, 4, 2]);

    grid.sort_by_column("Status", SortDirection::Ascending, true).await.unwrap();
    grid.sort_by_column("Freight", SortDirection::Descending, true).await.unwrap();
    assert_eq!(ids(&grid), once);
    assert_eq!(grid.view_state().sort.len(), 2);
}

#[tokio::test]
async fn test_search_resets_page() {
    let records = (0..20)
        .map(|i| order(i, if i % 2 == 0 { "Pending" } else { "Shipped" }, 1.0))
        .collect();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(order_columns())
        .settings(GridSettings::default().with_page_size(5))
        .build()
        .unwrap();
    grid.refresh().await;
    grid.go_to_page(3).await.unwrap();

    grid.search("pend").await.unwrap();
    assert_eq!(grid.current_page(), 1);
    assert_eq!(grid.total_count(), 10);

    grid.search("").await.unwrap();
    assert_eq!(grid.total_count(), 20);
}
