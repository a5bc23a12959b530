//! Value formatting and parsing.
//!
//! A [`ValueFormatter`] is resolved once per column from its type, optional
//! format code and the grid culture. Formatting and parsing dispatch through
//! the column type's [`TypeBehavior`](crate::column::TypeBehavior) entry.
//!
//! For any value accepted by a column's validation rules,
//! `parse(format(value))` gives the value back: exactly for integers and
//! booleans, within rounding for decimal formats, and on calendar fields for
//! dates.
//!
//! # Example
//!
//! ```
//! use horizon_grid::column::ColumnType;
//! use horizon_grid::format::{get_format_function, get_parser_function, FormatOptions};
//! use horizon_grid::Value;
//!
//! let options = FormatOptions::new(ColumnType::Number).with_format("N2");
//! let format = get_format_function(&options);
//! let parse = get_parser_function(&options);
//!
//! let text = format(&Value::Float(1234.5));
//! assert_eq!(text, "1,234.50");
//! assert_eq!(parse(&text).unwrap(), Value::Float(1234.5));
//! ```

mod culture;
mod date;
mod number;

use std::sync::Arc;

use crate::column::ColumnType;
use crate::error::FormatError;
use crate::value::Value;

pub use culture::{Culture, DateOrder};
pub use date::{coerce_datetime, to_strftime, DateFormatter};
pub use number::{NumberFormat, NumberFormatter, NumberStyle};

/// A shareable value-to-text function.
pub type FormatFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// A shareable text-to-value function.
pub type ParseFn = Arc<dyn Fn(&str) -> Result<Value, FormatError> + Send + Sync>;

/// Inputs for resolving a formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Column type.
    pub column_type: ColumnType,
    /// Optional format code (`N2`, `yMd`, `dd/MM/yyyy`, ...).
    pub format: Option<String>,
    /// Locale identifier.
    pub locale: String,
}

impl FormatOptions {
    /// Options for a type with no format code in the `en-US` locale.
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            format: None,
            locale: "en-US".to_string(),
        }
    }

    /// Set the format code.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

/// Resolve the format function for a column type, format and culture.
pub fn get_format_function(options: &FormatOptions) -> FormatFn {
    let formatter = ValueFormatter::from_options(options);
    Arc::new(move |value| formatter.format(value))
}

/// Resolve the parse function for a column type, format and culture.
pub fn get_parser_function(options: &FormatOptions) -> ParseFn {
    let formatter = ValueFormatter::from_options(options);
    Arc::new(move |text| formatter.parse(text))
}

#[derive(Debug, Clone)]
enum Converter {
    Text,
    Number(NumberFormatter),
    Date(DateFormatter),
}

/// Format/parse pair resolved for one column.
#[derive(Debug, Clone)]
pub struct ValueFormatter {
    column_type: ColumnType,
    format: Option<String>,
    converter: Converter,
}

impl ValueFormatter {
    /// Resolve a formatter for a type, optional format code and culture.
    pub fn new(column_type: ColumnType, format: Option<&str>, culture: &Culture) -> Self {
        let converter = match column_type {
            ColumnType::Number => {
                Converter::Number(NumberFormatter::new(culture.clone(), format.and_then(NumberFormat::parse)))
            }
            ColumnType::Date => Converter::Date(DateFormatter::new(culture, format, false)),
            ColumnType::DateTime => Converter::Date(DateFormatter::new(culture, format, true)),
            _ => Converter::Text,
        };
        Self {
            column_type,
            format: format.map(str::to_string),
            converter,
        }
    }

    /// Resolve a formatter from [`FormatOptions`].
    pub fn from_options(options: &FormatOptions) -> Self {
        Self::new(
            options.column_type,
            options.format.as_deref(),
            &Culture::parse(&options.locale),
        )
    }

    /// The column type this formatter was resolved for.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// The format code, if any.
    pub fn format_code(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Value to display text.
    pub fn format(&self, value: &Value) -> String {
        (self.column_type.behavior().format)(self, value)
    }

    /// Display text to value.
    pub fn parse(&self, text: &str) -> Result<Value, FormatError> {
        (self.column_type.behavior().parse)(self, text)
    }
}

pub(crate) fn format_text(_: &ValueFormatter, value: &Value) -> String {
    value.to_string()
}

pub(crate) fn parse_text(_: &ValueFormatter, text: &str) -> Result<Value, FormatError> {
    if text.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::String(text.to_string()))
    }
}

pub(crate) fn format_number(formatter: &ValueFormatter, value: &Value) -> String {
    let Converter::Number(number) = &formatter.converter else {
        return value.to_string();
    };
    match value {
        Value::String(s) => match number.parse(s) {
            Ok(parsed) if !parsed.is_null() => number.format(&parsed),
            _ => s.clone(),
        },
        _ => number.format(value),
    }
}

pub(crate) fn parse_number(formatter: &ValueFormatter, text: &str) -> Result<Value, FormatError> {
    match &formatter.converter {
        Converter::Number(number) => number.parse(text),
        _ => NumberFormatter::new(Culture::default(), None).parse(text),
    }
}

pub(crate) fn format_date(formatter: &ValueFormatter, value: &Value) -> String {
    match &formatter.converter {
        Converter::Date(date) => date.format(value),
        _ => value.to_string(),
    }
}

pub(crate) fn parse_date(formatter: &ValueFormatter, text: &str) -> Result<Value, FormatError> {
    match &formatter.converter {
        Converter::Date(date) => date.parse(text),
        _ => Err(FormatError::parse(text, "date")),
    }
}

pub(crate) fn format_boolean(_: &ValueFormatter, value: &Value) -> String {
    match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn parse_boolean(_: &ValueFormatter, text: &str) -> Result<Value, FormatError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "" => Ok(Value::Null),
        "true" | "yes" | "1" | "on" => Ok(Value::Bool(true)),
        "false" | "no" | "0" | "off" => Ok(Value::Bool(false)),
        _ => Err(FormatError::parse(text, "boolean")),
    }
}
