//! Horizon Grid - a headless data grid core.
//!
//! This crate turns a record set, a declarative column schema and a mutable
//! view state into a model of header, body and aggregate rows that any
//! presentation layer can render. It covers:
//!
//! - **Columns**: nested column trees, defaults, frozen columns, visibility
//!   and reordering ([`column`])
//! - **Formatting**: culture-aware format/parse pairs per column type
//!   ([`format`])
//! - **Rows and cells**: stacked header layout, body rows, aggregates and the
//!   empty-state row ([`row`])
//! - **Queries**: sort, filter, search and paging descriptors, the async
//!   [`DataSource`](query::DataSource) contract and an in-memory source
//!   ([`query`])
//! - **View state**: the query/regenerate pipeline with request generations
//!   ([`view`])
//! - **Editing**: the edit session state machine and validation ([`edit`])
//! - **Selection**: row selection with an explicit window-change policy
//!   ([`selection`])
//!
//! [`Grid`] ties them together behind an imperative API, and [`signals`]
//! reports what happens.
//!
//! # Example
//!
//! ```
//! use horizon_grid::column::ColumnDef;
//! use horizon_grid::query::LocalDataSource;
//! use horizon_grid::{Grid, GridSettings, Record};
//!
//! let records = (1..=15)
//!     .map(|id| Record::new().with("OrderID", id).with("Freight", f64::from(id) * 2.5))
//!     .collect();
//!
//! let grid = Grid::builder(LocalDataSource::new(records))
//!     .columns(vec![ColumnDef::new("OrderID").primary_key(true), ColumnDef::new("Freight")])
//!     .settings(GridSettings::default().with_page_size(8))
//!     .build()
//!     .unwrap();
//!
//! grid.signals().data_bound.connect(|bound| {
//!     println!("{} of {} records", bound.rows, bound.total_count);
//! });
//! ```

pub mod column;
pub mod edit;
pub mod error;
pub mod format;
pub mod grid;
pub mod query;
pub mod row;
pub mod selection;
pub mod settings;
pub mod signals;
pub mod value;
pub mod view;

pub use error::{GridError, Result};
pub use grid::{DeleteOutcome, Grid, GridBuilder, SaveOutcome};
pub use settings::GridSettings;
pub use value::{Record, Value};
pub use view::{LoadOutcome, ViewState};
