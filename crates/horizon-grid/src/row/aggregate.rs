//! Footer aggregates over the current view window.

use crate::column::{ColumnModel, ColumnType};
use crate::format::{Culture, ValueFormatter};
use crate::value::{Record, Value};

use super::{mark_edges, Cell, CellKind};

/// Aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateType {
    /// Sum of numeric values.
    Sum,
    /// Mean of numeric values.
    Average,
    /// Smallest non-null value.
    Min,
    /// Largest non-null value.
    Max,
    /// Number of records.
    Count,
    /// Number of `true` values.
    TrueCount,
    /// Number of `false` values.
    FalseCount,
}

impl AggregateType {
    /// Apply the function to one column's values.
    ///
    /// `Sum` stays an integer while every input is one. `Average` of no
    /// values, and `Min`/`Max` of only nulls, is `Null`.
    pub fn compute(self, values: &[Value]) -> Value {
        let present = || values.iter().filter(|v| !v.is_null());
        match self {
            AggregateType::Sum => {
                if present().all(|v| matches!(v, Value::Int(_))) {
                    Value::Int(present().filter_map(Value::as_int).sum())
                } else {
                    Value::Float(present().filter_map(Value::as_float).sum())
                }
            }
            AggregateType::Average => {
                let numbers: Vec<f64> = present().filter_map(Value::as_float).collect();
                if numbers.is_empty() {
                    Value::Null
                } else {
                    Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
            AggregateType::Min => present()
                .min_by(|a, b| a.compare(b))
                .cloned()
                .unwrap_or(Value::Null),
            AggregateType::Max => present()
                .max_by(|a, b| a.compare(b))
                .cloned()
                .unwrap_or(Value::Null),
            AggregateType::Count => Value::Int(values.len() as i64),
            AggregateType::TrueCount => Value::Int(count_bool(values, true)),
            AggregateType::FalseCount => Value::Int(count_bool(values, false)),
        }
    }

    fn is_count(self) -> bool {
        matches!(
            self,
            AggregateType::Count | AggregateType::TrueCount | AggregateType::FalseCount
        )
    }
}

fn count_bool(values: &[Value], wanted: bool) -> i64 {
    values.iter().filter(|v| v.as_bool() == Some(wanted)).count() as i64
}

/// One aggregate bound to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateColumn {
    /// Aggregated field.
    pub field: String,
    /// Aggregate function.
    pub aggregate_type: AggregateType,
    /// Number format code for the result; defaults to the column's format.
    pub format: Option<String>,
}

impl AggregateColumn {
    /// An aggregate over `field`.
    pub fn new(field: impl Into<String>, aggregate_type: AggregateType) -> Self {
        Self {
            field: field.into(),
            aggregate_type,
            format: None,
        }
    }

    /// Format the result with a number format code.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// One footer row of aggregates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateRowDef {
    /// Aggregates shown in this row, at most one per field.
    pub columns: Vec<AggregateColumn>,
}

impl AggregateRowDef {
    /// A row with the given aggregates.
    pub fn new(columns: Vec<AggregateColumn>) -> Self {
        Self { columns }
    }

    /// Build one aggregate cell per displayed leaf column. Columns without
    /// an aggregate get an empty aggregate cell.
    pub(crate) fn cells(&self, columns: &ColumnModel, records: &[Record]) -> Vec<Cell> {
        let mut cells: Vec<Cell> = columns
            .leaf_columns()
            .into_iter()
            .map(|column| {
                let mut cell = Cell::new(CellKind::Aggregate, Some(column.uid.clone()));
                let (Some(leaf), Some(field)) = (column.leaf(), column.field()) else {
                    return cell;
                };
                cell.text_align = leaf.text_align;
                let Some(aggregate) = self.columns.iter().find(|a| a.field == field) else {
                    return cell;
                };

                let values: Vec<Value> = records.iter().map(|r| leaf.value_of(r)).collect();
                let result = aggregate.aggregate_type.compute(&values);
                cell.display_text = match (&aggregate.format, aggregate.aggregate_type.is_count()) {
                    (Some(format), _) => {
                        ValueFormatter::new(ColumnType::Number, Some(format), columns.culture())
                            .format(&result)
                    }
                    (None, true) => result.to_string(),
                    (None, false) => format_like_column(&leaf.formatter, &result, columns.culture()),
                };
                cell.value = result;
                cell
            })
            .collect();
        mark_edges(&mut cells);
        cells
    }
}

fn format_like_column(formatter: &ValueFormatter, value: &Value, culture: &Culture) -> String {
    match (formatter.column_type(), value) {
        (ColumnType::Number | ColumnType::Date | ColumnType::DateTime, _) => formatter.format(value),
        (_, Value::Int(_) | Value::Float(_)) => {
            ValueFormatter::new(ColumnType::Number, None, culture).format(value)
        }
        _ => value.to_string(),
    }
}
