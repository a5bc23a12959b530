//! Column schema: declarations, the resolved column tree and its model.
//!
//! Columns are declared with [`ColumnDef`] builders, resolved once by a
//! [`ColumnResolver`] into a [`ColumnModel`], and from then on changed only
//! through the model's management calls (show, hide, reorder).
//!
//! A resolved [`Column`] is either a leaf bound to a field or template, or a
//! group whose only purpose is to span a header cell over its children:
//!
//! ```text
//! Order Details            (group, span 3)
//! ├── OrderID              (leaf)
//! └── Shipping             (group, span 2)
//!     ├── ShipCity         (leaf)
//!     └── ShipCountry      (leaf)
//! ```
//!
//! # Example
//!
//! ```
//! use horizon_grid::column::{ColumnDef, ColumnResolver, ColumnType};
//!
//! let model = ColumnResolver::with_locale("en-US")
//!     .resolve(vec![
//!         ColumnDef::new("OrderID").primary_key(true),
//!         ColumnDef::group(
//!             "Shipping",
//!             vec![
//!                 ColumnDef::new("ShipCity"),
//!                 ColumnDef::new("Freight").column_type(ColumnType::Number).format("C2"),
//!             ],
//!         ),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(model.depth(), 2);
//! assert_eq!(model.leaf_columns().len(), 3);
//! assert_eq!(model.primary_key_field(), Some("OrderID"));
//! ```

mod debug;
mod header;
mod resolver;
mod types;

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::logging::targets;

use crate::edit::ValidationRule;
use crate::error::ColumnError;
use crate::format::{Culture, ValueFormatter};
use crate::value::{Record, Value};

pub use debug::ColumnTreeDebug;
pub use header::{compute_depth, compute_span};
pub use resolver::ColumnResolver;
pub use types::{CellRenderer, ColumnType, EditType, TextAlign, TypeBehavior};

/// Declared width of a column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColumnWidth {
    /// Sized by the presentation layer.
    #[default]
    Auto,
    /// Fixed width in pixels.
    Pixels(f32),
    /// Percentage of the grid width.
    Percent(f32),
}

/// Which edge a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Freeze {
    /// Scrolls with the body.
    #[default]
    None,
    /// Pinned to the left edge.
    Left,
    /// Pinned to the right edge.
    Right,
}

/// Produces a cell's display text from its record.
#[derive(Clone)]
pub struct Template(Arc<dyn Fn(&Record) -> String + Send + Sync>);

impl Template {
    /// Wrap a rendering function.
    pub fn new(render: impl Fn(&Record) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(render))
    }

    /// Render the template for a record.
    pub fn render(&self, record: &Record) -> String {
        (self.0)(record)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Template(..)")
    }
}

/// Lookup of a display value in foreign data.
///
/// The record's raw value is matched against `foreign_key_field` of each
/// foreign record; the cell then shows that record's `foreign_key_value`.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    /// Field of the foreign data matched against the cell value.
    pub foreign_key_field: String,
    /// Field of the foreign data shown in the cell.
    pub foreign_key_value: String,
    /// The foreign data.
    pub data: Arc<Vec<Record>>,
}

impl ForeignKey {
    /// Describe a foreign-key lookup.
    pub fn new(
        foreign_key_field: impl Into<String>,
        foreign_key_value: impl Into<String>,
        data: Vec<Record>,
    ) -> Self {
        Self {
            foreign_key_field: foreign_key_field.into(),
            foreign_key_value: foreign_key_value.into(),
            data: Arc::new(data),
        }
    }

    /// The foreign record whose key equals `value`.
    pub fn lookup(&self, value: &Value) -> Option<&Record> {
        self.data.iter().find(|record| {
            record
                .get_path(&self.foreign_key_field)
                .is_some_and(|key| key.loosely_equals(value))
        })
    }

    /// The display value for a raw cell value, if a foreign record matches.
    pub fn display_value(&self, value: &Value) -> Option<&Value> {
        self.lookup(value)?.get_path(&self.foreign_key_value)
    }
}

/// A declared column, before resolution.
#[derive(Debug, Clone, Default)]
pub struct ColumnDef {
    pub(crate) field: Option<String>,
    pub(crate) uid: Option<String>,
    pub(crate) header_text: Option<String>,
    pub(crate) width: Option<ColumnWidth>,
    pub(crate) column_type: Option<ColumnType>,
    pub(crate) format: Option<String>,
    pub(crate) validation_rules: Vec<ValidationRule>,
    pub(crate) edit_type: Option<EditType>,
    pub(crate) text_align: Option<TextAlign>,
    pub(crate) is_primary_key: bool,
    pub(crate) is_identity: bool,
    pub(crate) visible: Option<bool>,
    pub(crate) freeze: Freeze,
    pub(crate) allow_editing: Option<bool>,
    pub(crate) allow_sorting: Option<bool>,
    pub(crate) allow_filtering: Option<bool>,
    pub(crate) allow_reordering: Option<bool>,
    pub(crate) default_value: Option<Value>,
    pub(crate) template: Option<Template>,
    pub(crate) foreign_key: Option<ForeignKey>,
    pub(crate) columns: Option<Vec<ColumnDef>>,
}

impl ColumnDef {
    /// A leaf column bound to a (dot-path) field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Default::default()
        }
    }

    /// A leaf column without a field, rendered from a template.
    pub fn templated(header_text: impl Into<String>, template: Template) -> Self {
        Self {
            header_text: Some(header_text.into()),
            column_type: Some(ColumnType::Template),
            template: Some(template),
            ..Default::default()
        }
    }

    /// A group column spanning its children.
    pub fn group(header_text: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            header_text: Some(header_text.into()),
            columns: Some(columns),
            ..Default::default()
        }
    }

    /// Nest child columns under this one.
    pub fn columns(mut self, columns: Vec<ColumnDef>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set an explicit column id.
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Set the header text.
    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        self.header_text = Some(text.into());
        self
    }

    /// Set the width.
    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the data type.
    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Set the format code.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Append a validation rule.
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    /// Set the editor type.
    pub fn edit_type(mut self, edit_type: EditType) -> Self {
        self.edit_type = Some(edit_type);
        self
    }

    /// Set the cell alignment.
    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    /// Mark the column as the primary key.
    pub fn primary_key(mut self, is_primary_key: bool) -> Self {
        self.is_primary_key = is_primary_key;
        self
    }

    /// Mark the column as generated by the data source (not editable on add).
    pub fn identity(mut self, is_identity: bool) -> Self {
        self.is_identity = is_identity;
        self
    }

    /// Hide the column initially.
    pub fn hidden(mut self) -> Self {
        self.visible = Some(false);
        self
    }

    /// Pin the column.
    pub fn freeze(mut self, freeze: Freeze) -> Self {
        self.freeze = freeze;
        self
    }

    /// Render cells with a template.
    pub fn template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    /// Resolve display values through foreign data.
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }

    /// Value used for this field when a new record is added.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Disallow editing.
    pub fn read_only(mut self) -> Self {
        self.allow_editing = Some(false);
        self
    }

    /// Allow or disallow sorting.
    pub fn allow_sorting(mut self, allow: bool) -> Self {
        self.allow_sorting = Some(allow);
        self
    }

    /// Allow or disallow filtering.
    pub fn allow_filtering(mut self, allow: bool) -> Self {
        self.allow_filtering = Some(allow);
        self
    }

    /// Disallow reordering.
    pub fn no_reorder(mut self) -> Self {
        self.allow_reordering = Some(false);
        self
    }
}

/// A resolved leaf column.
#[derive(Debug, Clone)]
pub struct LeafColumn {
    /// Bound field (dot-path). `None` for template-only columns.
    pub field: Option<String>,
    /// Data type.
    pub column_type: ColumnType,
    /// Whether the type was declared rather than defaulted.
    pub type_declared: bool,
    /// Format/parse pair for the column type and culture.
    pub formatter: ValueFormatter,
    /// Ordered validation rules.
    pub validation_rules: Vec<ValidationRule>,
    /// Editor type.
    pub edit_type: EditType,
    /// Cell alignment.
    pub text_align: TextAlign,
    /// Primary-key flag.
    pub is_primary_key: bool,
    /// Identity flag.
    pub is_identity: bool,
    /// Whether the field may be edited.
    pub allow_editing: bool,
    /// Whether the column may be sorted.
    pub allow_sorting: bool,
    /// Whether the column may be filtered.
    pub allow_filtering: bool,
    /// Default value for new records.
    pub default_value: Value,
    /// Cell template.
    pub template: Option<Template>,
    /// Foreign-key lookup.
    pub foreign_key: Option<ForeignKey>,
}

impl LeafColumn {
    /// Reads this column's value from a record through the field's dot-path.
    pub fn value_of(&self, record: &Record) -> Value {
        self.field
            .as_deref()
            .and_then(|field| record.get_path(field))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Display text for this column's cell in `record`.
    pub fn display_text(&self, record: &Record) -> String {
        if let Some(template) = &self.template {
            return template.render(record);
        }
        let value = self.value_of(record);
        if let Some(fk) = &self.foreign_key {
            if let Some(display) = fk.display_value(&value) {
                return display.to_string();
            }
        }
        self.formatter.format(&value)
    }

    /// The renderer strategy of this column's type.
    pub fn renderer(&self) -> CellRenderer {
        self.column_type.behavior().renderer
    }
}

/// Leaf or group payload of a [`Column`].
#[derive(Debug, Clone)]
pub enum ColumnKind {
    /// Bound to a field or template.
    Leaf(LeafColumn),
    /// Spans its children in the header.
    Group(Vec<Column>),
}

/// A resolved column tree node.
#[derive(Debug, Clone)]
pub struct Column {
    /// Unique, stable id.
    pub uid: String,
    /// Header text.
    pub header_text: String,
    /// Width.
    pub width: ColumnWidth,
    /// Visibility flag.
    pub visible: bool,
    /// Pin side.
    pub freeze: Freeze,
    /// Whether the column may be moved among its siblings.
    pub allow_reordering: bool,
    /// Leaf or group payload.
    pub kind: ColumnKind,
}

impl Column {
    /// Returns `true` for group columns.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ColumnKind::Group(_))
    }

    /// The leaf payload, if this is a leaf.
    pub fn leaf(&self) -> Option<&LeafColumn> {
        match &self.kind {
            ColumnKind::Leaf(leaf) => Some(leaf),
            ColumnKind::Group(_) => None,
        }
    }

    /// Mutable leaf payload.
    pub fn leaf_mut(&mut self) -> Option<&mut LeafColumn> {
        match &mut self.kind {
            ColumnKind::Leaf(leaf) => Some(leaf),
            ColumnKind::Group(_) => None,
        }
    }

    /// Child columns of a group; empty for leaves.
    pub fn children(&self) -> &[Column] {
        match &self.kind {
            ColumnKind::Group(children) => children,
            ColumnKind::Leaf(_) => &[],
        }
    }

    /// Bound field of a leaf.
    pub fn field(&self) -> Option<&str> {
        self.leaf().and_then(|leaf| leaf.field.as_deref())
    }

    /// Whether the column takes part in the layout: visible, and for groups,
    /// with at least one displayed descendant.
    pub fn is_displayed(&self) -> bool {
        self.visible
            && match &self.kind {
                ColumnKind::Leaf(_) => true,
                ColumnKind::Group(children) => children.iter().any(Column::is_displayed),
            }
    }

    /// Displayed leaf descendants (or `self`) in tree order.
    pub fn displayed_leaves(&self) -> Vec<&Column> {
        let mut out = Vec::new();
        self.collect_leaves(true, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, displayed_only: bool, out: &mut Vec<&'a Column>) {
        if displayed_only && !self.is_displayed() {
            return;
        }
        match &self.kind {
            ColumnKind::Leaf(_) => out.push(self),
            ColumnKind::Group(children) => {
                for child in children {
                    child.collect_leaves(displayed_only, out);
                }
            }
        }
    }

    fn find(&self, pred: &dyn Fn(&Column) -> bool) -> Option<&Column> {
        if pred(self) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(pred))
    }

    fn find_mut(&mut self, pred: &dyn Fn(&Column) -> bool) -> Option<&mut Column> {
        if pred(self) {
            return Some(self);
        }
        match &mut self.kind {
            ColumnKind::Group(children) => children.iter_mut().find_map(|child| child.find_mut(pred)),
            ColumnKind::Leaf(_) => None,
        }
    }
}

/// The resolved column tree of a grid.
#[derive(Debug, Clone)]
pub struct ColumnModel {
    columns: Vec<Column>,
    primary_key: Option<String>,
    culture: Culture,
}

impl ColumnModel {
    pub(crate) fn new(columns: Vec<Column>, primary_key: Option<String>, culture: Culture) -> Self {
        Self {
            columns,
            primary_key,
            culture,
        }
    }

    /// Top-level columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns `true` if no column is declared.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The culture formatters were resolved for.
    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    /// Displayed top-level columns in display order: frozen-left, movable,
    /// frozen-right.
    pub fn display_roots(&self) -> Vec<&Column> {
        let displayed = self.columns.iter().filter(|c| c.is_displayed());
        let mut left = Vec::new();
        let mut movable = Vec::new();
        let mut right = Vec::new();
        for column in displayed {
            match column.freeze {
                Freeze::Left => left.push(column),
                Freeze::None => movable.push(column),
                Freeze::Right => right.push(column),
            }
        }
        left.extend(movable);
        left.extend(right);
        left
    }

    /// Displayed leaf columns in display order. Row cells follow this order.
    pub fn leaf_columns(&self) -> Vec<&Column> {
        self.display_roots()
            .into_iter()
            .flat_map(Column::displayed_leaves)
            .collect()
    }

    /// Every leaf column, hidden ones included, in tree order.
    pub fn all_leaf_columns(&self) -> Vec<&Column> {
        let mut out = Vec::new();
        for column in &self.columns {
            column.collect_leaves(false, &mut out);
        }
        out
    }

    /// Number of header rows.
    pub fn depth(&self) -> usize {
        compute_depth(&self.columns)
    }

    /// Leaf column bound to `field`.
    pub fn column_by_field(&self, field: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find_map(|c| c.find(&|c| c.field() == Some(field)))
    }

    /// Column (leaf or group) with the given id.
    pub fn column_by_uid(&self, uid: &str) -> Option<&Column> {
        self.columns.iter().find_map(|c| c.find(&|c| c.uid == uid))
    }

    /// Position of the field's column among [`leaf_columns`](Self::leaf_columns).
    pub fn column_index_by_field(&self, field: &str) -> Option<usize> {
        self.leaf_columns()
            .iter()
            .position(|c| c.field() == Some(field))
    }

    /// Field of the primary-key column.
    pub fn primary_key_field(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Primary-key value of a record.
    pub fn key_of(&self, record: &Record) -> Option<Value> {
        let field = self.primary_key.as_deref()?;
        record.get_path(field).filter(|v| !v.is_null()).cloned()
    }

    /// Show columns by field or id. Returns how many columns changed.
    pub fn show_columns(&mut self, keys: &[&str]) -> Result<usize, ColumnError> {
        self.set_visibility(keys, true)
    }

    /// Hide columns by field or id. Returns how many columns changed.
    pub fn hide_columns(&mut self, keys: &[&str]) -> Result<usize, ColumnError> {
        self.set_visibility(keys, false)
    }

    fn set_visibility(&mut self, keys: &[&str], visible: bool) -> Result<usize, ColumnError> {
        if let Some(missing) = keys.iter().find(|key| self.find_by_key(key).is_none()) {
            return Err(ColumnError::UnknownField(missing.to_string()));
        }
        let mut changed = 0;
        for key in keys {
            if let Some(column) = self.find_by_key_mut(key) {
                if column.visible != visible {
                    column.visible = visible;
                    changed += 1;
                }
            }
        }
        tracing::debug!(
            target: targets::COLUMNS,
            ?keys,
            visible,
            changed,
            "column visibility changed"
        );
        Ok(changed)
    }

    /// Move a column (by field or id) to `to_index` among its siblings.
    pub fn reorder_column(&mut self, key: &str, to_index: usize) -> Result<(), ColumnError> {
        let column = self
            .find_by_key(key)
            .ok_or_else(|| ColumnError::UnknownField(key.to_string()))?;
        if !column.allow_reordering {
            return Err(ColumnError::NotReorderable(key.to_string()));
        }
        let uid = column.uid.clone();

        let siblings = siblings_of(&mut self.columns, &uid)
            .ok_or_else(|| ColumnError::UnknownId(uid.clone()))?;
        let count = siblings.len();
        if to_index >= count {
            return Err(ColumnError::PositionOutOfRange {
                index: to_index,
                count,
            });
        }
        let from = siblings
            .iter()
            .position(|c| c.uid == uid)
            .ok_or_else(|| ColumnError::UnknownId(uid.clone()))?;
        let column = siblings.remove(from);
        siblings.insert(to_index, column);

        tracing::debug!(target: targets::COLUMNS, %uid, from, to = to_index, "column reordered");
        Ok(())
    }

    /// Give untyped columns the type of the sample record's value.
    ///
    /// Called with the first record of the first load. Declared types are
    /// left alone.
    pub fn infer_types(&mut self, sample: &Record) {
        let culture = self.culture.clone();
        for column in &mut self.columns {
            infer_column_types(column, sample, &culture);
        }
    }

    fn find_by_key(&self, key: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find_map(|c| c.find(&|c| c.uid == key || c.field() == Some(key)))
    }

    fn find_by_key_mut(&mut self, key: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find_map(|c| c.find_mut(&|c| c.uid == key || c.field() == Some(key)))
    }
}

fn siblings_of<'a>(columns: &'a mut Vec<Column>, uid: &str) -> Option<&'a mut Vec<Column>> {
    if columns.iter().any(|c| c.uid == uid) {
        return Some(columns);
    }
    for column in columns.iter_mut() {
        if let ColumnKind::Group(children) = &mut column.kind {
            if let Some(found) = siblings_of(children, uid) {
                return Some(found);
            }
        }
    }
    None
}

fn infer_column_types(column: &mut Column, sample: &Record, culture: &Culture) {
    match &mut column.kind {
        ColumnKind::Group(children) => {
            for child in children {
                infer_column_types(child, sample, culture);
            }
        }
        ColumnKind::Leaf(leaf) => {
            if leaf.type_declared || leaf.template.is_some() {
                return;
            }
            let Some(inferred) = ColumnType::infer(&leaf.value_of(sample)) else {
                return;
            };
            if inferred == leaf.column_type {
                return;
            }
            let format = leaf.formatter.format_code().map(str::to_string);
            leaf.column_type = inferred;
            leaf.formatter = ValueFormatter::new(inferred, format.as_deref(), culture);
            let behavior = inferred.behavior();
            if leaf.foreign_key.is_none() {
                leaf.edit_type = behavior.default_edit_type;
            }
            leaf.text_align = behavior.text_align;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ColumnModel {
        ColumnResolver::with_locale("en-US")
            .resolve(vec![
                ColumnDef::new("OrderID").primary_key(true).freeze(Freeze::Right),
                ColumnDef::new("CustomerID"),
                ColumnDef::group(
                    "Ship",
                    vec![ColumnDef::new("ShipCity"), ColumnDef::new("ShipCountry")],
                )
                .uid("ship"),
                ColumnDef::new("Verified").column_type(ColumnType::Checkbox),
            ])
            .unwrap()
    }

    fn fields(columns: &[&Column]) -> Vec<String> {
        columns
            .iter()
            .map(|c| c.field().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_display_order_puts_frozen_last() {
        let model = model();
        assert_eq!(
            fields(&model.leaf_columns()),
            ["CustomerID", "ShipCity", "ShipCountry", "Verified", "OrderID"]
        );
        assert_eq!(model.column_index_by_field("OrderID"), Some(4));
    }

    #[test]
    fn test_lookups() {
        let model = model();
        assert_eq!(model.column_by_field("ShipCity").unwrap().uid, "ShipCity");
        assert!(model.column_by_uid("ship").unwrap().is_group());
        assert!(model.column_by_field("Missing").is_none());
        assert_eq!(model.primary_key_field(), Some("OrderID"));
        assert_eq!(
            model.key_of(&Record::new().with("OrderID", 10248)),
            Some(Value::Int(10248))
        );
    }

    #[test]
    fn test_hide_and_show() {
        let mut model = model();
        assert_eq!(model.hide_columns(&["ShipCity", "ShipCountry"]).unwrap(), 2);
        assert_eq!(model.depth(), 1);
        assert_eq!(model.leaf_columns().len(), 3);

        assert_eq!(model.show_columns(&["ShipCity"]).unwrap(), 1);
        assert_eq!(model.depth(), 2);
        assert!(matches!(
            model.hide_columns(&["Nope"]),
            Err(ColumnError::UnknownField(_))
        ));
    }

    #[test]
    fn test_reorder_within_siblings() {
        let mut model = model();
        model.reorder_column("ShipCountry", 0).unwrap();
        assert_eq!(
            fields(&model.leaf_columns())[1..3],
            ["ShipCountry".to_string(), "ShipCity".to_string()]
        );

        assert_eq!(
            model.reorder_column("Verified", 0),
            Err(ColumnError::NotReorderable("Verified".into()))
        );
        assert_eq!(
            model.reorder_column("CustomerID", 9),
            Err(ColumnError::PositionOutOfRange { index: 9, count: 4 })
        );
    }

    #[test]
    fn test_display_text_sources() {
        let employees = vec![
            Record::new().with("EmployeeID", 1).with("FirstName", "Nancy"),
            Record::new().with("EmployeeID", 2).with("FirstName", "Andrew"),
        ];
        let model = ColumnResolver::with_locale("en-US")
            .resolve(vec![
                ColumnDef::new("EmployeeID")
                    .foreign_key(ForeignKey::new("EmployeeID", "FirstName", employees)),
                ColumnDef::new("Freight").column_type(ColumnType::Number).format("C2"),
                ColumnDef::templated(
                    "Summary",
                    Template::new(|r| format!("#{}", r.get("EmployeeID").cloned().unwrap_or_default())),
                ),
            ])
            .unwrap();

        let record = Record::new().with("EmployeeID", 2).with("Freight", 32.38);
        let leaves = model.leaf_columns();
        assert_eq!(leaves[0].leaf().unwrap().display_text(&record), "Andrew");
        assert_eq!(leaves[1].leaf().unwrap().display_text(&record), "$32.38");
        assert_eq!(leaves[2].leaf().unwrap().display_text(&record), "#2");
        assert_eq!(leaves[2].leaf().unwrap().renderer(), CellRenderer::Template);
    }

    #[test]
    fn test_infer_types_from_sample() {
        let mut model = ColumnResolver::with_locale("en-US")
            .resolve(vec![
                ColumnDef::new("Freight"),
                ColumnDef::new("Code").column_type(ColumnType::String),
            ])
            .unwrap();
        model.infer_types(&Record::new().with("Freight", 1.5).with("Code", 7));

        let freight = model.column_by_field("Freight").unwrap().leaf().unwrap();
        assert_eq!(freight.column_type, ColumnType::Number);
        assert_eq!(freight.edit_type, EditType::Numeric);
        let code = model.column_by_field("Code").unwrap().leaf().unwrap();
        assert_eq!(code.column_type, ColumnType::String);
    }
}
