//! Resolution of declared columns into the typed column tree.

use std::collections::HashSet;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::{span_names, targets};

use crate::error::ColumnError;
use crate::format::{Culture, ValueFormatter};
use crate::value::Record;

use super::{
    Column, ColumnDef, ColumnKind, ColumnModel, ColumnTreeDebug, ColumnType, ColumnWidth, EditType,
    Freeze, LeafColumn,
};

/// Resolves [`ColumnDef`]s against a culture.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    culture: Culture,
    default_width: ColumnWidth,
}

#[derive(Default)]
struct ResolveState {
    uids: HashSet<String>,
    primary_key: Option<String>,
    next_auto: usize,
}

impl ColumnResolver {
    /// A resolver for the given culture.
    pub fn new(culture: Culture) -> Self {
        Self {
            culture,
            default_width: ColumnWidth::Auto,
        }
    }

    /// A resolver for a locale identifier.
    pub fn with_locale(locale: &str) -> Self {
        Self::new(Culture::parse(locale))
    }

    /// Width given to columns that do not declare one.
    pub fn default_width(mut self, width: ColumnWidth) -> Self {
        self.default_width = width;
        self
    }

    /// Resolve a declared schema.
    ///
    /// Fails on duplicate ids, on a second primary-key column, on group
    /// columns that declare a field, and on nested columns frozen to a side
    /// their group is not frozen to.
    pub fn resolve(&self, defs: Vec<ColumnDef>) -> Result<ColumnModel, ColumnError> {
        let _perf = PerfSpan::new(span_names::RESOLVE);

        let mut state = ResolveState::default();
        let columns = defs
            .into_iter()
            .map(|def| self.resolve_one(def, None, &mut state))
            .collect::<Result<Vec<_>, _>>()?;

        let model = ColumnModel::new(columns, state.primary_key, self.culture.clone());
        tracing::debug!(
            target: targets::COLUMNS,
            depth = model.depth(),
            leaves = model.leaf_columns().len(),
            primary_key = model.primary_key_field(),
            "columns resolved"
        );
        tracing::trace!(target: targets::COLUMNS, "\n{}", ColumnTreeDebug::new(&model));
        Ok(model)
    }

    /// Build one string-typed column per top-level field of `sample`, in the
    /// record's field order, then infer their types from it.
    pub fn infer_columns(&self, sample: &Record) -> Result<ColumnModel, ColumnError> {
        let defs = sample.keys().map(ColumnDef::new).collect();
        let mut model = self.resolve(defs)?;
        model.infer_types(sample);
        Ok(model)
    }

    fn resolve_one(
        &self,
        def: ColumnDef,
        group_freeze: Option<Freeze>,
        state: &mut ResolveState,
    ) -> Result<Column, ColumnError> {
        // Only top-level columns choose a side; nested ones follow their group.
        let freeze = match group_freeze {
            None => def.freeze,
            Some(group) if def.freeze == Freeze::None || def.freeze == group => group,
            Some(_) => {
                let name = def.uid.or(def.field).or(def.header_text).unwrap_or_default();
                return Err(ColumnError::NestedFreeze(name));
            }
        };

        if let Some(children) = def.columns {
            if let Some(field) = def.field {
                return Err(ColumnError::GroupWithField(field));
            }
            let uid = self.claim_uid(def.uid, None, "group", state)?;
            let children = children
                .into_iter()
                .map(|child| self.resolve_one(child, Some(freeze), state))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Column {
                uid,
                header_text: def.header_text.unwrap_or_default(),
                width: def.width.unwrap_or(self.default_width),
                visible: def.visible.unwrap_or(true),
                freeze,
                allow_reordering: def.allow_reordering.unwrap_or(true),
                kind: ColumnKind::Group(children),
            });
        }

        let uid = self.claim_uid(def.uid, def.field.as_deref(), "column", state)?;

        if def.is_primary_key {
            let field = def.field.clone().unwrap_or_else(|| uid.clone());
            if let Some(first) = &state.primary_key {
                return Err(ColumnError::DuplicatePrimaryKey {
                    first: first.clone(),
                    second: field,
                });
            }
            state.primary_key = Some(field);
        }

        let column_type = def.column_type.unwrap_or_default();
        let behavior = column_type.behavior();
        let edit_type = match (def.edit_type, &def.foreign_key) {
            (Some(explicit), _) => explicit,
            (None, Some(_)) => EditType::DropDown,
            (None, None) => behavior.default_edit_type,
        };
        let allow_reordering = column_type != ColumnType::Checkbox && def.allow_reordering.unwrap_or(true);

        let leaf = LeafColumn {
            formatter: ValueFormatter::new(column_type, def.format.as_deref(), &self.culture),
            field: def.field.clone(),
            column_type,
            type_declared: def.column_type.is_some(),
            validation_rules: def.validation_rules,
            edit_type,
            text_align: def.text_align.unwrap_or(behavior.text_align),
            is_primary_key: def.is_primary_key,
            is_identity: def.is_identity,
            allow_editing: def.allow_editing.unwrap_or(true),
            allow_sorting: def.allow_sorting.unwrap_or(def.field.is_some()),
            allow_filtering: def.allow_filtering.unwrap_or(def.field.is_some()),
            default_value: def.default_value.unwrap_or_default(),
            template: def.template,
            foreign_key: def.foreign_key,
        };

        Ok(Column {
            uid,
            header_text: def.header_text.or(def.field).unwrap_or_default(),
            width: def.width.unwrap_or(self.default_width),
            visible: def.visible.unwrap_or(true),
            freeze,
            allow_reordering,
            kind: ColumnKind::Leaf(leaf),
        })
    }

    fn claim_uid(
        &self,
        explicit: Option<String>,
        field: Option<&str>,
        prefix: &str,
        state: &mut ResolveState,
    ) -> Result<String, ColumnError> {
        let uid = match explicit.or_else(|| field.map(str::to_string)) {
            Some(uid) => uid,
            None => loop {
                let candidate = format!("{prefix}-{}", state.next_auto);
                state.next_auto += 1;
                if !state.uids.contains(&candidate) {
                    break candidate;
                }
            },
        };
        if !state.uids.insert(uid.clone()) {
            return Err(ColumnError::DuplicateId(uid));
        }
        Ok(uid)
    }
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new(Culture::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ForeignKey, TextAlign};
    use crate::value::Value;

    #[test]
    fn test_leaf_defaults() {
        let model = ColumnResolver::default()
            .resolve(vec![ColumnDef::new("ShipCity")])
            .unwrap();
        let column = &model.columns()[0];
        assert_eq!(column.uid, "ShipCity");
        assert_eq!(column.header_text, "ShipCity");
        assert_eq!(column.width, ColumnWidth::Auto);
        assert!(column.visible);
        let leaf = column.leaf().unwrap();
        assert_eq!(leaf.column_type, ColumnType::String);
        assert!(!leaf.type_declared);
        assert_eq!(leaf.edit_type, EditType::Default);
        assert!(leaf.allow_sorting);
    }

    #[test]
    fn test_group_is_synthesized_with_children() {
        let model = ColumnResolver::default()
            .default_width(ColumnWidth::Pixels(120.0))
            .resolve(vec![ColumnDef::group(
                "Ship",
                vec![ColumnDef::new("ShipCity"), ColumnDef::new("ShipCountry")],
            )
            .freeze(Freeze::Left)])
            .unwrap();
        let group = &model.columns()[0];
        assert!(group.is_group());
        assert_eq!(group.uid, "group-0");
        assert_eq!(group.children().len(), 2);
        assert!(group.children().iter().all(|c| c.freeze == Freeze::Left));
        assert_eq!(group.children()[0].width, ColumnWidth::Pixels(120.0));
    }

    #[test]
    fn test_nested_freeze_must_match_group() {
        let err = ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("OrderID"),
                ColumnDef::group(
                    "Ship",
                    vec![ColumnDef::new("ShipCity").freeze(Freeze::Left), ColumnDef::new("ShipCountry")],
                ),
            ])
            .unwrap_err();
        assert_eq!(err, ColumnError::NestedFreeze("ShipCity".into()));

        let err = ColumnResolver::default()
            .resolve(vec![ColumnDef::group(
                "Ship",
                vec![ColumnDef::new("ShipCity").freeze(Freeze::Right)],
            )
            .freeze(Freeze::Left)])
            .unwrap_err();
        assert_eq!(err, ColumnError::NestedFreeze("ShipCity".into()));

        let model = ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("OrderID"),
                ColumnDef::group(
                    "Ship",
                    vec![ColumnDef::new("ShipCity").freeze(Freeze::Right), ColumnDef::new("ShipCountry")],
                )
                .freeze(Freeze::Right),
                ColumnDef::new("Freight").freeze(Freeze::Left),
            ])
            .unwrap();
        let order: Vec<_> = model.leaf_columns().iter().map(|c| c.uid.as_str()).collect();
        assert_eq!(order, ["Freight", "OrderID", "ShipCity", "ShipCountry"]);
    }

    #[test]
    fn test_group_with_field_is_rejected() {
        let err = ColumnResolver::default()
            .resolve(vec![ColumnDef::new("Ship").columns(vec![ColumnDef::new("ShipCity")])])
            .unwrap_err();
        assert_eq!(err, ColumnError::GroupWithField("Ship".into()));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = ColumnResolver::default()
            .resolve(vec![ColumnDef::new("OrderID"), ColumnDef::new("OrderID")])
            .unwrap_err();
        assert_eq!(err, ColumnError::DuplicateId("OrderID".into()));
    }

    #[test]
    fn test_second_primary_key_is_rejected() {
        let err = ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("OrderID").primary_key(true),
                ColumnDef::new("CustomerID").primary_key(true),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            ColumnError::DuplicatePrimaryKey {
                first: "OrderID".into(),
                second: "CustomerID".into()
            }
        );
    }

    #[test]
    fn test_foreign_key_forces_drop_down() {
        let fk = || ForeignKey::new("EmployeeID", "FirstName", Vec::new());
        let model = ColumnResolver::default()
            .resolve(vec![
                ColumnDef::new("EmployeeID").foreign_key(fk()),
                ColumnDef::new("ManagerID").foreign_key(fk()).edit_type(EditType::Numeric),
            ])
            .unwrap();
        let leaves = model.all_leaf_columns();
        assert_eq!(leaves[0].leaf().unwrap().edit_type, EditType::DropDown);
        assert_eq!(leaves[1].leaf().unwrap().edit_type, EditType::Numeric);
    }

    #[test]
    fn test_checkbox_is_not_reorderable() {
        let model = ColumnResolver::default()
            .resolve(vec![ColumnDef::new("Verified").column_type(ColumnType::Checkbox)])
            .unwrap();
        let column = &model.columns()[0];
        assert!(!column.allow_reordering);
        assert_eq!(column.leaf().unwrap().text_align, TextAlign::Center);
    }

    #[test]
    fn test_infer_columns_from_record() {
        let sample = Record::new()
            .with("OrderID", 10248)
            .with("ShipCity", "Reims")
            .with("Verified", true)
            .with("Extra", Value::Null);
        let model = ColumnResolver::default().infer_columns(&sample).unwrap();

        let types: Vec<_> = model
            .all_leaf_columns()
            .iter()
            .map(|c| c.leaf().unwrap().column_type)
            .collect();
        assert_eq!(
            types,
            [
                ColumnType::Number,
                ColumnType::String,
                ColumnType::Boolean,
                ColumnType::String
            ]
        );
        assert_eq!(model.primary_key_field(), None);
    }
}
