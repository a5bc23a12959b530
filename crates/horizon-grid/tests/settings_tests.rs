//! Settings loaded from TOML drive a live grid.

use horizon_grid::column::{ColumnDef, ColumnType};
use horizon_grid::edit::ConfirmPrompt;
use horizon_grid::query::LocalDataSource;
use horizon_grid::{DeleteOutcome, Grid, GridSettings, Record, Value};

const SETTINGS: &str = r#"
locale = "de-DE"

[page]
page_size = 4

[edit]
allow_deleting = true
show_delete_confirm_dialog = true

[selection]
mode = "multiple"
"#;

fn grid(gate: fn(&ConfirmPrompt) -> bool) -> (Grid, LocalDataSource) {
    let source = LocalDataSource::new(
        (1..=10)
            .map(|id| Record::new().with("OrderID", id).with("Freight", f64::from(id) * 1000.5))
            .collect(),
    );
    let grid = Grid::builder(source.clone())
        .columns(vec![
            ColumnDef::new("OrderID").primary_key(true),
            ColumnDef::new("Freight").column_type(ColumnType::Number).format("N2"),
        ])
        .settings(GridSettings::from_toml_str(SETTINGS).unwrap())
        .confirmation_gate(gate)
        .build()
        .unwrap();
    (grid, source)
}

#[tokio::test]
async fn test_page_size_and_locale() {
    let (grid, _) = grid(|_| true);
    grid.refresh().await;

    assert_eq!(grid.get_current_view_records().len(), 4);
    assert_eq!(grid.page_count(), 3);
    let rows = grid.row_model();
    let freight = rows.rows[0].cell("Freight").unwrap();
    assert_eq!(freight.display_text, "1.000,50");
}

#[tokio::test]
async fn test_confirm_dialog_consults_gate() {
    let (grid, source) = grid(|prompt| !matches!(prompt, ConfirmPrompt::DeleteRecord { .. }));
    grid.refresh().await;

    let outcome = grid.delete_record(Some(Value::Int(1))).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(source.len(), 10);
}

#[tokio::test]
async fn test_multiple_selection_from_settings() {
    let (grid, _) = grid(|_| true);
    grid.refresh().await;
    grid.select_rows(&[0, 1, 3]).unwrap();
    assert_eq!(grid.get_selected_row_indexes(), [0, 1, 3]);
}
