//! View-state pipeline tests: request generations, failures, busy state and
//! cancellation.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use horizon_grid::column::ColumnDef;
use horizon_grid::edit::ConfirmPrompt;
use horizon_grid::error::QueryError;
use horizon_grid::query::{DataSource, LocalDataSource, Query, QueryResult, SortDirection};
use horizon_grid::settings::NewRowPosition;
use horizon_grid::signals::RequestType;
use horizon_grid::{Grid, GridError, GridSettings, LoadOutcome, Record, Value};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

type Reply = oneshot::Sender<Result<QueryResult, QueryError>>;

/// A data source whose queries are answered by the test.
struct ManualSource {
    requests: mpsc::UnboundedSender<(Query, Reply)>,
}

impl ManualSource {
    fn new() -> (Self, mpsc::UnboundedReceiver<(Query, Reply)>) {
        let (requests, rx) = mpsc::unbounded_channel();
        (Self { requests }, rx)
    }
}

impl DataSource for ManualSource {
    fn execute_query(&self, query: Query) -> BoxFuture<'static, Result<QueryResult, QueryError>> {
        let (tx, rx) = oneshot::channel();
        let _ = self.requests.send((query, tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(QueryError::rejected("reply dropped")))
        }
        .boxed()
    }

    fn insert(
        &self,
        _key_field: &str,
        _record: Record,
        _position: NewRowPosition,
    ) -> BoxFuture<'static, Result<(), QueryError>> {
        future::ready(Ok(())).boxed()
    }

    fn update(&self, _key_field: &str, _record: Record) -> BoxFuture<'static, Result<(), QueryError>> {
        future::ready(Ok(())).boxed()
    }

    fn remove(&self, _key_field: &str, _key: Value) -> BoxFuture<'static, Result<(), QueryError>> {
        future::ready(Ok(())).boxed()
    }
}

/// A data source that rejects every query.
struct OfflineSource;

impl DataSource for OfflineSource {
    fn execute_query(&self, _query: Query) -> BoxFuture<'static, Result<QueryResult, QueryError>> {
        future::ready(Err(QueryError::rejected("offline"))).boxed()
    }

    fn insert(
        &self,
        _key_field: &str,
        _record: Record,
        _position: NewRowPosition,
    ) -> BoxFuture<'static, Result<(), QueryError>> {
        future::ready(Err(QueryError::rejected("offline"))).boxed()
    }

    fn update(&self, _key_field: &str, _record: Record) -> BoxFuture<'static, Result<(), QueryError>> {
        future::ready(Err(QueryError::rejected("offline"))).boxed()
    }

    fn remove(&self, _key_field: &str, _key: Value) -> BoxFuture<'static, Result<(), QueryError>> {
        future::ready(Err(QueryError::rejected("offline"))).boxed()
    }
}

fn window(ids: &[i64], count: usize) -> QueryResult {
    QueryResult {
        result: ids.iter().map(|&id| Record::new().with("OrderID", id).with("Freight", 1.0)).collect(),
        count,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_grid=debug")
        .with_test_writer()
        .try_init();
}

fn columns() -> Vec<ColumnDef> {
    vec![ColumnDef::new("OrderID").primary_key(true), ColumnDef::new("Freight")]
}

fn view_ids(grid: &Grid) -> Vec<i64> {
    grid.get_current_view_records()
        .iter()
        .filter_map(|r| r.get("OrderID").and_then(Value::as_int))
        .collect()
}

#[tokio::test]
async fn test_late_response_is_discarded() {
    init_tracing();
    let (source, mut requests) = ManualSource::new();
    let grid = Grid::builder(source).columns(columns()).build().unwrap();

    let sort = grid.sort_by_column("Freight", SortDirection::Descending, false);
    let search = grid.search("7");
    let answer = async {
        let (_, first) = requests.recv().await.unwrap();
        let (second_query, second) = requests.recv().await.unwrap();
        assert!(second_query.search.is_some());
        second.send(Ok(window(&[7], 1))).unwrap();
        tokio::task::yield_now().await;
        first.send(Ok(window(&[1, 2, 3], 3))).unwrap();
    };
    let (sorted, searched, ()) = tokio::join!(sort, search, answer);

    assert_eq!(sorted.unwrap(), LoadOutcome::Stale);
    assert_eq!(searched.unwrap(), LoadOutcome::Loaded { rows: 1, total_count: 1 });
    assert_eq!(view_ids(&grid), [7]);
    assert!(!grid.is_busy());
    // The state keeps both changes even though the first response was dropped.
    let state = grid.view_state();
    assert_eq!(state.sort.len(), 1);
    assert_eq!(state.search, "7");
}

#[tokio::test]
async fn test_manual_tickets() {
    let (source, _requests) = ManualSource::new();
    let grid = Grid::builder(source).columns(columns()).build().unwrap();

    let older = grid.issue_query();
    let newer = grid.issue_query();
    assert!(newer.generation > older.generation);
    assert!(grid.is_busy());

    let applied = grid.complete_query(newer.generation, Ok(window(&[4, 5], 2)), RequestType::Refresh);
    assert!(applied.is_loaded());
    let dropped = grid.complete_query(older.generation, Ok(window(&[9], 1)), RequestType::Refresh);
    assert_eq!(dropped, LoadOutcome::Stale);
    assert_eq!(view_ids(&grid), [4, 5]);
    assert!(!grid.is_busy());
}

#[tokio::test]
async fn test_failure_shows_empty_state() {
    init_tracing();
    let grid = Grid::builder(OfflineSource).columns(columns()).build().unwrap();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let seen = failures.clone();
    grid.signals().action_failure.connect(move |failure| {
        seen.lock().push((failure.request_type, failure.error.to_string()));
    });

    let outcome = grid.sort_by_column("Freight", SortDirection::Ascending, false).await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Failed(_)));
    assert!(grid.get_current_view_records().is_empty());
    assert!(grid.row_model().is_empty_state());
    assert_eq!(grid.view_state().sort.len(), 1);
    assert_eq!(
        failures.lock().as_slice(),
        [(RequestType::Sorting, "data source rejected the request: offline".to_string())]
    );
}

#[tokio::test]
async fn test_busy_and_lifecycle_signals() {
    let records = (1..=4).map(|id| Record::new().with("OrderID", id).with("Freight", 1.0)).collect();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(columns())
        .build()
        .unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));

    let log = events.clone();
    grid.signals().busy_changed.connect(move |busy| log.lock().push(format!("busy {busy}")));
    let log = events.clone();
    grid.signals().render_start.connect(move |_| log.lock().push("render start".into()));
    let log = events.clone();
    grid.signals().render_complete.connect(move |_| log.lock().push("render complete".into()));
    let log = events.clone();
    grid.signals().data_bound.connect(move |bound| log.lock().push(format!("bound {}", bound.rows)));
    let log = events.clone();
    grid.signals().action_complete.connect(move |args| log.lock().push(format!("{:?}", args.request_type)));

    grid.refresh().await;
    assert_eq!(
        events.lock().as_slice(),
        ["busy true", "render start", "render complete", "bound 4", "busy false", "Refresh"]
    );
}

#[tokio::test]
async fn test_action_begin_can_veto() {
    let records = (1..=20).map(|id| Record::new().with("OrderID", id).with("Freight", 1.0)).collect();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(columns())
        .settings(GridSettings::default().with_page_size(5))
        .build()
        .unwrap();
    grid.refresh().await;

    grid.signals().action_begin.connect(|args| {
        if args.request_type == RequestType::Paging {
            args.cancel.cancel();
        }
    });
    assert_eq!(grid.go_to_page(2).await.unwrap(), LoadOutcome::Cancelled);
    assert_eq!(grid.current_page(), 1);
    assert_eq!(view_ids(&grid), [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_page_change_guards_unsaved_edit() {
    let records = (1..=20).map(|id| Record::new().with("OrderID", id).with("Freight", 1.0)).collect();
    let mut settings = GridSettings::default().with_page_size(5).editable();
    settings.edit.show_unsaved_confirm_dialog = true;
    let answer = Arc::new(Mutex::new(false));
    let gate_answer = answer.clone();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(columns())
        .settings(settings)
        .confirmation_gate(move |prompt: &ConfirmPrompt| {
            assert_eq!(prompt, &ConfirmPrompt::DiscardChanges);
            *gate_answer.lock()
        })
        .build()
        .unwrap();
    grid.refresh().await;
    assert!(grid.begin_edit(0).unwrap());

    assert_eq!(grid.go_to_page(2).await.unwrap(), LoadOutcome::Cancelled);
    assert_eq!(grid.current_page(), 1);
    assert!(grid.edit_session().is_some());

    *answer.lock() = true;
    assert!(grid.go_to_page(2).await.unwrap().is_loaded());
    assert_eq!(grid.current_page(), 2);
    assert!(grid.edit_session().is_none());
}

#[tokio::test]
async fn test_vetoed_page_change_keeps_edit_session() {
    let records = (1..=20).map(|id| Record::new().with("OrderID", id).with("Freight", 1.0)).collect();
    let grid = Grid::builder(LocalDataSource::new(records))
        .columns(columns())
        .settings(GridSettings::default().with_page_size(5).editable())
        .build()
        .unwrap();
    grid.refresh().await;
    assert!(grid.begin_edit(0).unwrap());
    grid.set_edit_field("Freight", 9.0).unwrap();

    let completed = Arc::new(Mutex::new(Vec::new()));
    let log = completed.clone();
    grid.signals().action_complete.connect(move |args| log.lock().push(args.request_type));
    let veto = grid.signals().action_begin.connect(|args| {
        if args.request_type == RequestType::Paging {
            args.cancel.cancel();
        }
    });

    assert_eq!(grid.go_to_page(2).await.unwrap(), LoadOutcome::Cancelled);
    assert_eq!(grid.current_page(), 1);
    let session = grid.edit_session().unwrap();
    assert_eq!(session.working().get("Freight"), Some(&Value::Float(9.0)));
    assert!(completed.lock().is_empty());

    grid.signals().action_begin.disconnect(veto);
    assert!(grid.go_to_page(2).await.unwrap().is_loaded());
    assert!(grid.edit_session().is_none());
    assert_eq!(completed.lock().as_slice(), [RequestType::Cancel, RequestType::Paging]);
}

#[tokio::test]
async fn test_unknown_or_locked_columns_are_rejected() {
    let grid = Grid::builder(LocalDataSource::default())
        .columns(vec![
            ColumnDef::new("OrderID").primary_key(true),
            ColumnDef::new("Freight").allow_sorting(false),
        ])
        .build()
        .unwrap();
    assert!(matches!(
        grid.sort_by_column("Nope", SortDirection::Ascending, false).await,
        Err(GridError::Column(_))
    ));
    assert!(matches!(
        grid.sort_by_column("Freight", SortDirection::Ascending, false).await,
        Err(GridError::Column(_))
    ));
    assert!(grid.view_state().sort.is_empty());
}
