//! Culture-aware number formatting and parsing.
//!
//! Number columns accept a short format code:
//!
//! - `N2` - grouped number with 2 decimals (`1,234.50`)
//! - `C2` - currency (`$1,234.50`, `1.234,50 €`)
//! - `P1` - percent, the value is multiplied by 100 (`12.5%`)
//! - `F3` - fixed decimals without grouping (`1234.500`)
//!
//! A custom pattern such as `#,##0.00` is understood as "grouped when it
//! contains a comma, decimals = digits after the point".

use crate::error::FormatError;
use crate::value::Value;

use super::culture::Culture;

/// The style part of a number format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Grouped decimal number.
    Number,
    /// Grouped number with currency symbol.
    Currency,
    /// Grouped number scaled by 100 with a percent sign.
    Percent,
    /// Ungrouped number with fixed decimals.
    Fixed,
}

/// A parsed number format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// Presentation style.
    pub style: NumberStyle,
    /// Number of decimal places.
    pub decimals: usize,
}

impl NumberFormat {
    /// Parse a format code like `N2`, `c`, `P0` or a custom `#,##0.00` pattern.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        let mut chars = code.chars();
        let first = chars.next()?;
        let rest = chars.as_str();

        let style = match first.to_ascii_uppercase() {
            'N' => Some(NumberStyle::Number),
            'C' => Some(NumberStyle::Currency),
            'P' => Some(NumberStyle::Percent),
            'F' => Some(NumberStyle::Fixed),
            _ => None,
        };

        if let Some(style) = style {
            if rest.is_empty() {
                let decimals = match style {
                    NumberStyle::Percent => 0,
                    _ => 2,
                };
                return Some(Self { style, decimals });
            }
            if let Ok(decimals) = rest.parse::<usize>() {
                return Some(Self { style, decimals });
            }
            return None;
        }

        if code.chars().all(|c| matches!(c, '#' | '0' | ',' | '.')) {
            let decimals = code
                .split_once('.')
                .map(|(_, frac)| frac.chars().filter(|c| matches!(c, '#' | '0')).count())
                .unwrap_or(0);
            let style = if code.contains(',') {
                NumberStyle::Number
            } else {
                NumberStyle::Fixed
            };
            return Some(Self { style, decimals });
        }
        None
    }
}

/// Formats and parses numbers for one culture.
#[derive(Debug, Clone)]
pub struct NumberFormatter {
    culture: Culture,
    format: Option<NumberFormat>,
}

impl NumberFormatter {
    /// Create a formatter. `format` of `None` writes plain numbers.
    pub fn new(culture: Culture, format: Option<NumberFormat>) -> Self {
        Self { culture, format }
    }

    /// The format code in use.
    pub fn number_format(&self) -> Option<NumberFormat> {
        self.format
    }

    /// Format a value. Non-numeric values fall back to their plain text.
    pub fn format(&self, value: &Value) -> String {
        let Some(number) = value.as_float() else {
            return value.to_string();
        };

        let Some(format) = self.format else {
            return match value {
                Value::Int(n) => n.to_string(),
                _ => number.to_string().replace('.', &self.culture.decimal_sep.to_string()),
            };
        };

        match format.style {
            NumberStyle::Number => self.format_with_precision(number, format.decimals, true),
            NumberStyle::Fixed => self.format_with_precision(number, format.decimals, false),
            NumberStyle::Percent => {
                let text = self.format_with_precision(number * 100.0, format.decimals, true);
                format!("{text}%")
            }
            NumberStyle::Currency => {
                let text = self.format_with_precision(number.abs(), format.decimals, true);
                let sign = if number < 0.0 { "-" } else { "" };
                if self.culture.currency_suffix {
                    format!("{sign}{text} {}", self.culture.currency_symbol)
                } else {
                    format!("{sign}{}{text}", self.culture.currency_symbol)
                }
            }
        }
    }

    /// Parse display text produced by [`format`](Self::format) (or typed by a
    /// user) back into a number.
    ///
    /// Text without a decimal part parses to `Int`, anything else to `Float`.
    /// Empty text parses to `Null`.
    pub fn parse(&self, text: &str) -> Result<Value, FormatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }

        let is_percent = trimmed.ends_with('%');
        let mut cleaned: String = trimmed
            .trim_end_matches('%')
            .replace(self.culture.currency_symbol, "")
            .chars()
            .filter(|c| {
                *c != self.culture.thousands_sep && !matches!(c, ' ' | '\u{00A0}' | '\u{202F}')
            })
            .collect();
        if self.culture.decimal_sep != '.' {
            cleaned = cleaned.replace(self.culture.decimal_sep, ".");
        }

        if is_percent {
            return cleaned
                .parse::<f64>()
                .map(|n| Value::Float(n / 100.0))
                .map_err(|_| FormatError::parse(text, "percent"));
        }

        if !cleaned.contains(['.', 'e', 'E']) {
            if let Ok(n) = cleaned.parse::<i64>() {
                return Ok(Value::Int(n));
            }
        }
        cleaned
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| FormatError::parse(text, "number"))
    }

    fn format_with_precision(&self, value: f64, decimal_places: usize, grouped: bool) -> String {
        let is_negative = value < 0.0;
        let formatted = format!("{:.prec$}", value.abs(), prec = decimal_places);

        let (integer_part, decimal_part) = match formatted.split_once('.') {
            Some((int, dec)) => (int, Some(dec)),
            None => (formatted.as_str(), None),
        };

        let integer_formatted = if grouped {
            self.format_with_thousands(integer_part)
        } else {
            integer_part.to_string()
        };

        let result = match decimal_part {
            Some(dec) => format!("{}{}{}", integer_formatted, self.culture.decimal_sep, dec),
            None => integer_formatted,
        };

        // "-0.00" reads badly; drop the sign when everything rounded to zero.
        if is_negative && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-{result}")
        } else {
            result
        }
    }

    fn format_with_thousands(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let len = chars.len();

        if len <= 3 {
            return s.to_string();
        }

        let mut result = String::with_capacity(len + len / 3);
        for (i, c) in chars.iter().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                result.push(self.culture.thousands_sep);
            }
            result.push(*c);
        }
        result
    }
}
