//! Logging facilities for Horizon Grid.
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_grid=debug")
//!     .init();
//! ```

/// Span names used throughout Horizon Grid for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Row/cell model regeneration span.
    pub const REGENERATE: &str = "horizon_grid::regenerate";
    /// Query round-trip span.
    pub const QUERY: &str = "horizon_grid::query";
    /// Column resolution span.
    pub const RESOLVE: &str = "horizon_grid::resolve";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_grid_core";
    /// Signal system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Column model target.
    pub const COLUMNS: &str = "horizon_grid::columns";
    /// View state controller target.
    pub const VIEW: &str = "horizon_grid::view";
    /// Query engine / data source target.
    pub const QUERY: &str = "horizon_grid::query";
    /// Edit session target.
    pub const EDIT: &str = "horizon_grid::edit";
    /// Selection target.
    pub const SELECTION: &str = "horizon_grid::selection";
    /// Performance spans.
    pub const PERF: &str = "horizon_grid::perf";
}

/// A guard that keeps a tracing span entered while it is alive.
///
/// This is useful for tracking the duration of operations such as a full
/// row/cell regeneration.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_grid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
