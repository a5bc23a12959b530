//! Grid configuration.
//!
//! Every section has defaults, so a settings file only lists what differs:
//!
//! ```
//! use horizon_grid::GridSettings;
//!
//! let settings = GridSettings::from_toml_str(
//!     r#"
//!     locale = "de-DE"
//!
//!     [page]
//!     page_size = 8
//!
//!     [edit]
//!     allow_editing = true
//!     show_delete_confirm_dialog = true
//!
//!     [selection]
//!     mode = "multiple"
//!     policy = "remap_by_primary_key"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.page.page_size, 8);
//! assert!(settings.page.enabled);
//! assert!(!settings.edit.allow_adding);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::FilterOperator;
use crate::selection::{SelectionMode, SelectionPolicy};

/// Paging options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Whether the view is paged.
    pub enabled: bool,
    /// Records per page.
    pub page_size: usize,
    /// Initial page, 1-based.
    pub current_page: usize,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: 12,
            current_page: 1,
        }
    }
}

/// Where a new record goes in the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewRowPosition {
    /// Before all other records.
    Top,
    /// After all other records.
    #[default]
    Bottom,
}

/// Editing options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditSettings {
    /// Allow adding records.
    pub allow_adding: bool,
    /// Allow editing records.
    pub allow_editing: bool,
    /// Allow deleting records.
    pub allow_deleting: bool,
    /// Ask before deleting.
    pub show_delete_confirm_dialog: bool,
    /// Ask before discarding an active edit session.
    pub show_unsaved_confirm_dialog: bool,
    /// Insert position of added records.
    pub new_row_position: NewRowPosition,
}

impl EditSettings {
    /// Whether any kind of mutation is enabled.
    pub fn any_enabled(&self) -> bool {
        self.allow_adding || self.allow_editing || self.allow_deleting
    }
}

/// Selection options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Single or multiple selection.
    pub mode: SelectionMode,
    /// What happens to the selection when the view window changes.
    pub policy: SelectionPolicy,
}

/// Search options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Case-insensitive search.
    pub ignore_case: bool,
    /// Text operator used for every searched column.
    pub operator: FilterOperator,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            ignore_case: true,
            operator: FilterOperator::Contains,
        }
    }
}

/// All grid options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Paging.
    pub page: PageSettings,
    /// Editing.
    pub edit: EditSettings,
    /// Selection.
    pub selection: SelectionSettings,
    /// Search.
    pub search: SearchSettings,
    /// Flag odd rows for alternate styling.
    pub alternate_rows: bool,
    /// Culture used for formatting and parsing.
    pub locale: String,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            page: PageSettings::default(),
            edit: EditSettings::default(),
            selection: SelectionSettings::default(),
            search: SearchSettings::default(),
            alternate_rows: true,
            locale: "en-US".to_string(),
        }
    }
}

impl GridSettings {
    /// Parse settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Enable paging with the given page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page.enabled = true;
        self.page.page_size = page_size.max(1);
        self
    }

    /// Disable paging.
    pub fn without_paging(mut self) -> Self {
        self.page.enabled = false;
        self
    }

    /// Replace the edit options.
    pub fn with_edit(mut self, edit: EditSettings) -> Self {
        self.edit = edit;
        self
    }

    /// Enable adding, editing and deleting.
    pub fn editable(mut self) -> Self {
        self.edit.allow_adding = true;
        self.edit.allow_editing = true;
        self.edit.allow_deleting = true;
        self
    }

    /// Replace the selection options.
    pub fn with_selection(mut self, mode: SelectionMode, policy: SelectionPolicy) -> Self {
        self.selection = SelectionSettings { mode, policy };
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Enable or disable the alternate-row flag.
    pub fn with_alternate_rows(mut self, enabled: bool) -> Self {
        self.alternate_rows = enabled;
        self
    }
}
