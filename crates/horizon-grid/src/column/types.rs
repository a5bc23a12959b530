//! Column type enumeration and its behavior table.
//!
//! Every [`ColumnType`] maps to one [`TypeBehavior`] entry holding the
//! formatter, parser, cell renderer and editor defaults for that type.

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;
use crate::format::{self, ValueFormatter};
use crate::value::Value;

/// Data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnType {
    /// Free text.
    #[default]
    String,
    /// Integer or floating-point number.
    Number,
    /// Calendar date.
    Date,
    /// Date and time.
    DateTime,
    /// True/false shown as text.
    Boolean,
    /// True/false shown as a checkbox.
    Checkbox,
    /// Content produced by a template.
    Template,
}

impl ColumnType {
    /// The behavior entry for this type.
    pub fn behavior(self) -> &'static TypeBehavior {
        match self {
            ColumnType::String => &STRING,
            ColumnType::Number => &NUMBER,
            ColumnType::Date => &DATE,
            ColumnType::DateTime => &DATE_TIME,
            ColumnType::Boolean => &BOOLEAN,
            ColumnType::Checkbox => &CHECKBOX,
            ColumnType::Template => &TEMPLATE,
        }
    }

    /// Guess a column type from a sample value.
    pub fn infer(value: &Value) -> Option<Self> {
        match value {
            Value::Int(_) | Value::Float(_) => Some(ColumnType::Number),
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Date(_) => Some(ColumnType::Date),
            Value::DateTime(_) => Some(ColumnType::DateTime),
            Value::String(_) => Some(ColumnType::String),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Boolean => "boolean",
            ColumnType::Checkbox => "checkbox",
            ColumnType::Template => "template",
        };
        f.write_str(name)
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(ColumnType::String),
            "number" => Ok(ColumnType::Number),
            "date" => Ok(ColumnType::Date),
            "datetime" => Ok(ColumnType::DateTime),
            "boolean" => Ok(ColumnType::Boolean),
            "checkbox" => Ok(ColumnType::Checkbox),
            "template" => Ok(ColumnType::Template),
            other => Err(format!("unknown column type '{other}'")),
        }
    }
}

/// Editor used for a column while an edit session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditType {
    /// Plain text box.
    #[default]
    Default,
    /// Numeric spinner.
    Numeric,
    /// Date picker.
    DatePicker,
    /// Date-time picker.
    DateTimePicker,
    /// Checkbox.
    Boolean,
    /// Drop-down list (foreign-key columns).
    DropDown,
}

/// Horizontal alignment of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

/// How a presentation layer should draw a data cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellRenderer {
    /// Display text.
    Text,
    /// A checkbox bound to a boolean.
    Checkbox,
    /// Output of the column template.
    Template,
}

/// Per-type behavior: value conversion plus rendering and editing defaults.
pub struct TypeBehavior {
    /// Value to display text.
    pub format: fn(&ValueFormatter, &Value) -> String,
    /// Display text back to value.
    pub parse: fn(&ValueFormatter, &str) -> Result<Value, FormatError>,
    /// Cell renderer strategy.
    pub renderer: CellRenderer,
    /// Editor used when the column does not set one.
    pub default_edit_type: EditType,
    /// Alignment used when the column does not set one.
    pub text_align: TextAlign,
}

impl fmt::Debug for TypeBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBehavior")
            .field("renderer", &self.renderer)
            .field("default_edit_type", &self.default_edit_type)
            .field("text_align", &self.text_align)
            .finish_non_exhaustive()
    }
}

static STRING: TypeBehavior = TypeBehavior {
    format: format::format_text,
    parse: format::parse_text,
    renderer: CellRenderer::Text,
    default_edit_type: EditType::Default,
    text_align: TextAlign::Left,
};

static NUMBER: TypeBehavior = TypeBehavior {
    format: format::format_number,
    parse: format::parse_number,
    renderer: CellRenderer::Text,
    default_edit_type: EditType::Numeric,
    text_align: TextAlign::Right,
};

static DATE: TypeBehavior = TypeBehavior {
    format: format::format_date,
    parse: format::parse_date,
    renderer: CellRenderer::Text,
    default_edit_type: EditType::DatePicker,
    text_align: TextAlign::Right,
};

static DATE_TIME: TypeBehavior = TypeBehavior {
    format: format::format_date,
    parse: format::parse_date,
    renderer: CellRenderer::Text,
    default_edit_type: EditType::DateTimePicker,
    text_align: TextAlign::Right,
};

static BOOLEAN: TypeBehavior = TypeBehavior {
    format: format::format_boolean,
    parse: format::parse_boolean,
    renderer: CellRenderer::Text,
    default_edit_type: EditType::Boolean,
    text_align: TextAlign::Center,
};

static CHECKBOX: TypeBehavior = TypeBehavior {
    format: format::format_boolean,
    parse: format::parse_boolean,
    renderer: CellRenderer::Checkbox,
    default_edit_type: EditType::Boolean,
    text_align: TextAlign::Center,
};

static TEMPLATE: TypeBehavior = TypeBehavior {
    format: format::format_text,
    parse: format::parse_text,
    renderer: CellRenderer::Template,
    default_edit_type: EditType::Default,
    text_align: TextAlign::Left,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_table() {
        assert_eq!(ColumnType::Number.behavior().default_edit_type, EditType::Numeric);
        assert_eq!(ColumnType::Number.behavior().text_align, TextAlign::Right);
        assert_eq!(ColumnType::Checkbox.behavior().renderer, CellRenderer::Checkbox);
        assert_eq!(ColumnType::Template.behavior().renderer, CellRenderer::Template);
    }

    #[test]
    fn test_from_str_and_display() {
        for ty in [
            ColumnType::String,
            ColumnType::Number,
            ColumnType::Date,
            ColumnType::DateTime,
            ColumnType::Boolean,
            ColumnType::Checkbox,
            ColumnType::Template,
        ] {
            assert_eq!(ty.to_string().parse::<ColumnType>(), Ok(ty));
        }
        assert!("money".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_infer() {
        assert_eq!(ColumnType::infer(&Value::Float(1.5)), Some(ColumnType::Number));
        assert_eq!(ColumnType::infer(&Value::Bool(true)), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::infer(&Value::Null), None);
    }
}
