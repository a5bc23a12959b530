//! Field validation rules.
//!
//! Each leaf column carries an ordered list of [`ValidationRule`]s. A field
//! is valid when every rule passes; the message of the first failing rule is
//! what the edit session reports.
//!
//! Apart from [`ValidationRule::required`], rules accept blank values, so an
//! optional field may be left empty and still satisfy `min`, `regex` and so
//! on.
//!
//! # Example
//!
//! ```
//! use horizon_grid::edit::ValidationRule;
//! use horizon_grid::{Record, Value};
//!
//! let rules = vec![ValidationRule::required(), ValidationRule::min(1.0)];
//! let record = Record::new();
//!
//! assert_eq!(
//!     horizon_grid::edit::first_failure(&rules, &Value::Null, &record).as_deref(),
//!     Some("This field is required.")
//! );
//! assert_eq!(horizon_grid::edit::first_failure(&rules, &Value::Int(3), &record), None);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::format::coerce_datetime;
use crate::value::{Record, Value};

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").ok()
});

/// A custom field check.
///
/// Receives the candidate value and the whole working record, so checks may
/// depend on other fields.
pub trait FieldValidator: Send + Sync {
    /// Returns `true` when the value is acceptable.
    fn validate(&self, value: &Value, record: &Record) -> bool;
}

impl<F> FieldValidator for F
where
    F: Fn(&Value, &Record) -> bool + Send + Sync,
{
    fn validate(&self, value: &Value, record: &Record) -> bool {
        self(value, record)
    }
}

#[derive(Clone)]
enum RuleKind {
    Required,
    Min(f64),
    Max(f64),
    Range(f64, f64),
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Email,
    Number,
    Date,
    Custom(Arc<dyn FieldValidator>),
}

/// One validation rule with an optional custom message.
#[derive(Clone)]
pub struct ValidationRule {
    kind: RuleKind,
    message: Option<String>,
}

impl ValidationRule {
    fn from_kind(kind: RuleKind) -> Self {
        Self { kind, message: None }
    }

    /// The value must not be null or blank text.
    pub fn required() -> Self {
        Self::from_kind(RuleKind::Required)
    }

    /// Numeric value must be at least `min`.
    pub fn min(min: f64) -> Self {
        Self::from_kind(RuleKind::Min(min))
    }

    /// Numeric value must be at most `max`.
    pub fn max(max: f64) -> Self {
        Self::from_kind(RuleKind::Max(max))
    }

    /// Numeric value must lie in `min..=max`.
    pub fn range(min: f64, max: f64) -> Self {
        Self::from_kind(RuleKind::Range(min, max))
    }

    /// Text must have at least `len` characters.
    pub fn min_length(len: usize) -> Self {
        Self::from_kind(RuleKind::MinLength(len))
    }

    /// Text must have at most `len` characters.
    pub fn max_length(len: usize) -> Self {
        Self::from_kind(RuleKind::MaxLength(len))
    }

    /// Text must match the regular expression.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_kind(RuleKind::Pattern(Regex::new(pattern)?)))
    }

    /// Text must look like an e-mail address.
    pub fn email() -> Self {
        Self::from_kind(RuleKind::Email)
    }

    /// Value must be numeric or numeric text.
    pub fn number() -> Self {
        Self::from_kind(RuleKind::Number)
    }

    /// Value must be a date, a date-time or ISO-8601 text.
    pub fn date() -> Self {
        Self::from_kind(RuleKind::Date)
    }

    /// A caller-supplied check.
    pub fn custom(validator: impl FieldValidator + 'static, message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Custom(Arc::new(validator)),
            message: Some(message.into()),
        }
    }

    /// Replace the default failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns `true` for the `required` rule.
    pub fn is_required(&self) -> bool {
        matches!(self.kind, RuleKind::Required)
    }

    /// The message reported when this rule fails.
    pub fn message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.kind {
            RuleKind::Required => "This field is required.".to_string(),
            RuleKind::Min(min) => format!("Please enter a value greater than or equal to {min}."),
            RuleKind::Max(max) => format!("Please enter a value less than or equal to {max}."),
            RuleKind::Range(min, max) => {
                format!("Please enter a value between {min} and {max}.")
            }
            RuleKind::MinLength(len) => format!("Please enter at least {len} characters."),
            RuleKind::MaxLength(len) => format!("Please enter no more than {len} characters."),
            RuleKind::Pattern(_) => "Please enter a value in the expected format.".to_string(),
            RuleKind::Email => "Please enter a valid email address.".to_string(),
            RuleKind::Number => "Please enter a valid number.".to_string(),
            RuleKind::Date => "Please enter a valid date.".to_string(),
            RuleKind::Custom(_) => "Please enter a valid value.".to_string(),
        }
    }

    /// Check a value. `record` is the working copy the value belongs to.
    pub fn check(&self, value: &Value, record: &Record) -> bool {
        if let RuleKind::Required = self.kind {
            return !value.is_blank();
        }
        if value.is_blank() {
            return true;
        }
        match &self.kind {
            RuleKind::Required => true,
            RuleKind::Min(min) => numeric(value).is_some_and(|n| n >= *min),
            RuleKind::Max(max) => numeric(value).is_some_and(|n| n <= *max),
            RuleKind::Range(min, max) => numeric(value).is_some_and(|n| n >= *min && n <= *max),
            RuleKind::MinLength(len) => text(value).chars().count() >= *len,
            RuleKind::MaxLength(len) => text(value).chars().count() <= *len,
            RuleKind::Pattern(re) => re.is_match(&text(value)),
            RuleKind::Email => EMAIL.as_ref().is_some_and(|re| re.is_match(&text(value))),
            RuleKind::Number => numeric(value).is_some(),
            RuleKind::Date => coerce_datetime(value).is_some(),
            RuleKind::Custom(validator) => validator.validate(value, record),
        }
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            RuleKind::Required => "required".to_string(),
            RuleKind::Min(n) => format!("min({n})"),
            RuleKind::Max(n) => format!("max({n})"),
            RuleKind::Range(a, b) => format!("range({a}, {b})"),
            RuleKind::MinLength(n) => format!("min_length({n})"),
            RuleKind::MaxLength(n) => format!("max_length({n})"),
            RuleKind::Pattern(re) => format!("regex({})", re.as_str()),
            RuleKind::Email => "email".to_string(),
            RuleKind::Number => "number".to_string(),
            RuleKind::Date => "date".to_string(),
            RuleKind::Custom(_) => "custom".to_string(),
        };
        f.debug_struct("ValidationRule")
            .field("kind", &kind)
            .field("message", &self.message)
            .finish()
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_float(),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Runs `rules` in order and returns the first failing rule's message.
pub fn first_failure(rules: &[ValidationRule], value: &Value, record: &Record) -> Option<String> {
    rules
        .iter()
        .find(|rule| !rule.check(value, record))
        .map(ValidationRule::message)
}

/// Per-field validation messages of an edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// An empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no field has an error.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with an error.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns `true` if the field has an error.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Record or replace a field's message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    /// Clear a field's message.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.errors.remove(field)
    }

    /// Clear all messages.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Fields and messages, ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
