//! Row selection relative to the current view window.
//!
//! Selected rows are stored as positions inside the view window, not as
//! records. [`SelectionManager::selected_records`] resolves them against the
//! window passed in at call time, so nothing is cached. What happens to the
//! positions when the window changes is decided by [`SelectionPolicy`].
//!
//! # Example
//!
//! ```
//! use horizon_grid::selection::{SelectionManager, SelectionMode, SelectionPolicy};
//! use horizon_grid::settings::SelectionSettings;
//!
//! let mut selection = SelectionManager::new(SelectionSettings {
//!     mode: SelectionMode::Multiple,
//!     policy: SelectionPolicy::Clear,
//! });
//! selection.select_row_by_range(1, 3, 10).unwrap();
//! assert_eq!(selection.selected_indexes(), &[1, 2, 3]);
//! ```

use std::collections::HashSet;

use horizon_grid_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::column::ColumnModel;
use crate::error::{GridError, Result};
use crate::row::{Row, RowKind};
use crate::settings::SelectionSettings;
use crate::value::Record;

/// How many rows can be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one row.
    #[default]
    Single,
    /// Any number of rows.
    Multiple,
}

/// What the selection does when the view window changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Drop the selection.
    #[default]
    Clear,
    /// Follow the selected records by primary key into the new window.
    /// Records that left the window are dropped.
    RemapByPrimaryKey,
    /// Keep the raw positions, whatever record now sits there.
    PersistIndex,
}

/// Positions that entered or left the selection in one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// Newly selected positions, ascending.
    pub selected: Vec<usize>,
    /// Newly deselected positions, ascending.
    pub deselected: Vec<usize>,
}

impl SelectionChange {
    fn between(before: &[usize], after: &[usize]) -> Self {
        let before_set: HashSet<usize> = before.iter().copied().collect();
        let after_set: HashSet<usize> = after.iter().copied().collect();
        let mut selected: Vec<usize> = after_set.difference(&before_set).copied().collect();
        let mut deselected: Vec<usize> = before_set.difference(&after_set).copied().collect();
        selected.sort_unstable();
        deselected.sort_unstable();
        Self {
            selected,
            deselected,
        }
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

/// Tracks selected view positions.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    mode: SelectionMode,
    policy: SelectionPolicy,
    selected: Vec<usize>,
}

impl SelectionManager {
    /// An empty selection with the given mode and policy.
    pub fn new(settings: SelectionSettings) -> Self {
        Self {
            mode: settings.mode,
            policy: settings.policy,
            selected: Vec::new(),
        }
    }

    /// Selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Window-change policy.
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Selected positions in selection order.
    pub fn selected_indexes(&self) -> &[usize] {
        &self.selected
    }

    /// Whether `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Select the row at `index` in a window of `len` rows.
    ///
    /// Without `toggle` the row replaces the selection. With `toggle` a
    /// selected row is deselected; an unselected row is added in
    /// [`SelectionMode::Multiple`] and replaces the selection otherwise.
    pub fn select_row(&mut self, index: usize, toggle: bool, len: usize) -> Result<SelectionChange> {
        check_index(index, len)?;
        let next = if toggle && self.is_selected(index) {
            self.selected.iter().copied().filter(|&i| i != index).collect()
        } else if toggle && self.mode == SelectionMode::Multiple {
            let mut next = self.selected.clone();
            next.push(index);
            next
        } else {
            vec![index]
        };
        Ok(self.replace(next))
    }

    /// Replace the selection with `indexes`.
    ///
    /// In [`SelectionMode::Single`] only the first index is kept.
    pub fn select_rows(&mut self, indexes: &[usize], len: usize) -> Result<SelectionChange> {
        for &index in indexes {
            check_index(index, len)?;
        }
        let mut next = Vec::with_capacity(indexes.len());
        for &index in indexes {
            if !next.contains(&index) {
                next.push(index);
            }
        }
        if self.mode == SelectionMode::Single {
            next.truncate(1);
        }
        Ok(self.replace(next))
    }

    /// Replace the selection with every position between `start` and `end`,
    /// inclusive, in either order.
    ///
    /// In [`SelectionMode::Single`] the range collapses to `end`.
    pub fn select_row_by_range(&mut self, start: usize, end: usize, len: usize) -> Result<SelectionChange> {
        check_index(start, len)?;
        check_index(end, len)?;
        let next = match self.mode {
            SelectionMode::Single => vec![end],
            SelectionMode::Multiple => (start.min(end)..=start.max(end)).collect(),
        };
        Ok(self.replace(next))
    }

    /// Drop every selected position.
    pub fn clear_selection(&mut self) -> SelectionChange {
        self.replace(Vec::new())
    }

    /// The records at the selected positions of `view`, in selection order.
    /// A position past the end of `view` yields `None`.
    pub fn selected_records<'a>(&self, view: &'a [Record]) -> Vec<Option<&'a Record>> {
        self.selected.iter().map(|&index| view.get(index)).collect()
    }

    /// Apply the window-change policy after the view moved from `old_view`
    /// to `new_view`.
    ///
    /// [`SelectionPolicy::RemapByPrimaryKey`] falls back to clearing when the
    /// columns have no primary key.
    pub fn on_view_changed(
        &mut self,
        old_view: &[Record],
        new_view: &[Record],
        columns: &ColumnModel,
    ) -> SelectionChange {
        if self.selected.is_empty() {
            return SelectionChange::default();
        }
        let next = match self.policy {
            SelectionPolicy::Clear => Vec::new(),
            SelectionPolicy::PersistIndex => self.selected.clone(),
            SelectionPolicy::RemapByPrimaryKey if columns.primary_key_field().is_none() => Vec::new(),
            SelectionPolicy::RemapByPrimaryKey => {
                let keys: Vec<_> = self
                    .selected
                    .iter()
                    .filter_map(|&index| old_view.get(index))
                    .filter_map(|record| columns.key_of(record))
                    .collect();
                keys.iter()
                    .filter_map(|key| {
                        new_view.iter().position(|record| {
                            columns.key_of(record).is_some_and(|k| k.loosely_equals(key))
                        })
                    })
                    .collect()
            }
        };
        tracing::debug!(
            target: targets::SELECTION,
            policy = ?self.policy,
            before = ?self.selected,
            after = ?next,
            "selection carried across view change"
        );
        self.replace(next)
    }

    /// Set `is_selected` on the data rows of a freshly generated body.
    pub fn mark_rows(&self, rows: &mut [Row]) {
        for (position, row) in rows
            .iter_mut()
            .filter(|row| row.kind == RowKind::Data)
            .enumerate()
        {
            row.is_selected = self.is_selected(position);
        }
    }

    fn replace(&mut self, next: Vec<usize>) -> SelectionChange {
        let change = SelectionChange::between(&self.selected, &next);
        self.selected = next;
        if !change.is_empty() {
            tracing::debug!(
                target: targets::SELECTION,
                selected = ?change.selected,
                deselected = ?change.deselected,
                "selection changed"
            );
        }
        change
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(GridError::RowOutOfRange { index, len });
    }
    Ok(())
}
