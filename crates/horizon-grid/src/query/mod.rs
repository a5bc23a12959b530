//! Query descriptors and the data-source contract.
//!
//! A [`Query`] encodes what the view needs from the data: ordered sort
//! descriptors, filter predicates, an optional search, and the page window
//! (`skip`/`take`). A [`DataSource`] executes it asynchronously and answers
//! with the window's records plus the total count before paging.
//!
//! Filter predicates on the same field are folded in declaration order with
//! their [`Combinator`]; predicates on different fields are ANDed.

mod local;
mod source;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::format::coerce_datetime;
use crate::value::{Record, Value};

pub use local::LocalDataSource;
pub use source::DataSource;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortDirection::Ascending),
            "descending" | "desc" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    /// Sorted field (dot-path).
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortDescriptor {
    /// A sort key.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Compare two records on this key. Nulls sort first when ascending.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let null = Value::Null;
        let va = a.get_path(&self.field).unwrap_or(&null);
        let vb = b.get_path(&self.field).unwrap_or(&null);
        let ordering = match (va, vb) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            _ => va.compare(vb),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to the value.
    Equal,
    /// Not equal to the value.
    NotEqual,
    /// Greater than the value.
    GreaterThan,
    /// Greater than or equal to the value.
    GreaterThanOrEqual,
    /// Less than the value.
    LessThan,
    /// Less than or equal to the value.
    LessThanOrEqual,
    /// Text starts with the value.
    StartsWith,
    /// Text ends with the value.
    EndsWith,
    /// Text contains the value.
    Contains,
    /// Field is null.
    IsNull,
    /// Field is not null.
    IsNotNull,
}

impl FilterOperator {
    fn is_text(self) -> bool {
        matches!(
            self,
            FilterOperator::StartsWith | FilterOperator::EndsWith | FilterOperator::Contains
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterOperator::Equal => "equal",
            FilterOperator::NotEqual => "notequal",
            FilterOperator::GreaterThan => "greaterthan",
            FilterOperator::GreaterThanOrEqual => "greaterthanorequal",
            FilterOperator::LessThan => "lessthan",
            FilterOperator::LessThanOrEqual => "lessthanorequal",
            FilterOperator::StartsWith => "startswith",
            FilterOperator::EndsWith => "endswith",
            FilterOperator::Contains => "contains",
            FilterOperator::IsNull => "isnull",
            FilterOperator::IsNotNull => "isnotnull",
        };
        f.write_str(name)
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equal" | "eq" => Ok(FilterOperator::Equal),
            "notequal" | "ne" => Ok(FilterOperator::NotEqual),
            "greaterthan" | "gt" => Ok(FilterOperator::GreaterThan),
            "greaterthanorequal" | "ge" => Ok(FilterOperator::GreaterThanOrEqual),
            "lessthan" | "lt" => Ok(FilterOperator::LessThan),
            "lessthanorequal" | "le" => Ok(FilterOperator::LessThanOrEqual),
            "startswith" => Ok(FilterOperator::StartsWith),
            "endswith" => Ok(FilterOperator::EndsWith),
            "contains" => Ok(FilterOperator::Contains),
            "isnull" => Ok(FilterOperator::IsNull),
            "isnotnull" => Ok(FilterOperator::IsNotNull),
            other => Err(format!("unknown filter operator '{other}'")),
        }
    }
}

/// How a predicate joins the previous predicate on the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Both must hold.
    #[default]
    And,
    /// Either may hold.
    Or,
}

/// One filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    /// Filtered field (dot-path).
    pub field: String,
    /// Operator.
    pub operator: FilterOperator,
    /// Operand.
    pub value: Value,
    /// Join with the previous predicate on the same field.
    pub combinator: Combinator,
    /// Whether text comparison is case sensitive.
    pub case_sensitive: bool,
}

impl FilterPredicate {
    /// A case-insensitive, AND-joined predicate.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            combinator: Combinator::And,
            case_sensitive: false,
        }
    }

    /// Set the combinator.
    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }

    /// Set case sensitivity.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Test one record.
    pub fn matches(&self, record: &Record) -> bool {
        let null = Value::Null;
        let actual = record.get_path(&self.field).unwrap_or(&null);
        compare_values(actual, self.operator, &self.value, self.case_sensitive)
    }
}

fn compare_values(actual: &Value, operator: FilterOperator, operand: &Value, case_sensitive: bool) -> bool {
    match operator {
        FilterOperator::IsNull => return actual.is_null(),
        FilterOperator::IsNotNull => return !actual.is_null(),
        _ => {}
    }

    if operator.is_text() {
        if actual.is_null() {
            return false;
        }
        let (text, needle) = (fold(&actual.to_string(), case_sensitive), fold(&operand.to_string(), case_sensitive));
        return match operator {
            FilterOperator::StartsWith => text.starts_with(&needle),
            FilterOperator::EndsWith => text.ends_with(&needle),
            _ => text.contains(&needle),
        };
    }

    let operand = coerce_operand(actual, operand);
    let ordering = match (actual, &operand) {
        (Value::String(a), Value::String(b)) if !case_sensitive => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        _ if actual.loosely_equals(&operand) => Ordering::Equal,
        (Value::Null, _) | (_, Value::Null) => {
            return operator == FilterOperator::NotEqual;
        }
        _ => actual.compare(&operand),
    };
    match operator {
        FilterOperator::Equal => ordering == Ordering::Equal,
        FilterOperator::NotEqual => ordering != Ordering::Equal,
        FilterOperator::GreaterThan => ordering == Ordering::Greater,
        FilterOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        FilterOperator::LessThan => ordering == Ordering::Less,
        FilterOperator::LessThanOrEqual => ordering != Ordering::Greater,
        _ => false,
    }
}

fn fold(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Text operands typed by a user are read as the field's type.
fn coerce_operand(actual: &Value, operand: &Value) -> Value {
    let Value::String(text) = operand else {
        return operand.clone();
    };
    match actual {
        Value::Int(_) | Value::Float(_) => match text.trim().parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => text.trim().parse::<f64>().map(Value::Float).unwrap_or_else(|_| operand.clone()),
        },
        Value::Bool(_) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => operand.clone(),
        },
        Value::Date(_) => coerce_datetime(operand)
            .map(|dt| Value::Date(dt.date()))
            .unwrap_or_else(|| operand.clone()),
        Value::DateTime(_) => coerce_datetime(operand)
            .map(Value::DateTime)
            .unwrap_or_else(|| operand.clone()),
        _ => operand.clone(),
    }
}

/// Evaluate a predicate list against a record.
pub fn matches_all(filters: &[FilterPredicate], record: &Record) -> bool {
    let mut fields: Vec<&str> = Vec::new();
    for predicate in filters {
        if !fields.contains(&predicate.field.as_str()) {
            fields.push(&predicate.field);
        }
    }
    fields.into_iter().all(|field| {
        let mut group = filters.iter().filter(|p| p.field == field);
        let Some(first) = group.next() else {
            return true;
        };
        group.fold(first.matches(record), |acc, p| match p.combinator {
            Combinator::And => acc && p.matches(record),
            Combinator::Or => acc || p.matches(record),
        })
    })
}

/// Free-text search over a set of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Search text.
    pub text: String,
    /// Fields searched.
    pub fields: Vec<String>,
    /// Text operator.
    pub operator: FilterOperator,
    /// Whether case is ignored.
    pub ignore_case: bool,
}

impl SearchQuery {
    /// A case-insensitive `contains` search.
    pub fn new(text: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            text: text.into(),
            fields,
            operator: FilterOperator::Contains,
            ignore_case: true,
        }
    }

    /// Whether any searched field matches. Empty text matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let operand = Value::String(self.text.clone());
        self.fields.iter().any(|field| {
            record
                .get_path(field)
                .is_some_and(|value| compare_values(value, self.operator, &operand, !self.ignore_case))
        })
    }
}

/// A request to a data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Records to skip after sorting and filtering.
    pub skip: usize,
    /// Window size; `None` takes everything.
    pub take: Option<usize>,
    /// Sort keys, primary first.
    pub sort: Vec<SortDescriptor>,
    /// Filter predicates.
    pub filters: Vec<FilterPredicate>,
    /// Search.
    pub search: Option<SearchQuery>,
    /// Whether the total count is wanted.
    pub requires_count: bool,
}

impl Query {
    /// Whether a record passes the filters and the search.
    pub fn matches(&self, record: &Record) -> bool {
        matches_all(&self.filters, record)
            && self.search.as_ref().is_none_or(|search| search.matches(record))
    }

    /// Order two records by the sort keys, in list order.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.sort
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// A data source's answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Records of the requested window.
    pub result: Vec<Record>,
    /// Matching records before paging.
    pub count: usize,
}
