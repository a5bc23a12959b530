//! Core systems for Horizon Grid.
//!
//! This crate provides the observer plumbing shared by every grid component:
//!
//! - **Signal/Slot System**: Type-safe notification of model changes
//! - **Cancel Flags**: Let a slot veto an action announced by a "begin" signal
//! - **Logging**: `tracing` targets, span names and a timing guard
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::{CancelFlag, Signal};
//!
//! let before_page_change = Signal::<CancelFlag>::new();
//! before_page_change.connect(|flag| flag.cancel());
//!
//! let flag = CancelFlag::new();
//! before_page_change.emit(flag.clone());
//! assert!(flag.is_cancelled());
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{CancelFlag, ConnectionId, Signal};
