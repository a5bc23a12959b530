//! Cell values and records.
//!
//! A [`Record`] is one row of raw data as handed over by a data source. Its
//! fields hold [`Value`]s, a closed set of the types a grid column can
//! display. Nested objects are addressed with dot-paths (`"ShipAddress.City"`).

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A type-erased cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    String(String),
    /// Calendar date without time.
    Date(NaiveDate),
    /// Date and time without zone.
    DateTime(NaiveDateTime),
    /// List of values.
    Array(Vec<Value>),
    /// Nested record.
    Object(Record),
}

impl Value {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for `Null` and for strings that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, converting integral floats.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the date part of a `Date` or `DateTime`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Returns a `DateTime`, promoting a `Date` to midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the nested record if this is an `Object`.
    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Rank used to order values of unrelated types. Null sorts first.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Date(_) | Value::DateTime(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Integers and floats compare numerically, dates and date-times compare
    /// on the time line, and values of unrelated types order by type rank.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let (a, b) = (self.as_float().unwrap_or(0.0), other.as_float().unwrap_or(0.0));
                // NaN sorts after every number.
                match (a.is_nan(), b.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                }
            }
            (Value::Date(_) | Value::DateTime(_), Value::Date(_) | Value::DateTime(_)) => {
                self.as_datetime().cmp(&other.as_datetime())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Equality that treats `Int(5)` and `Float(5.0)` as equal, and a date
    /// equal to the same date at midnight.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_))
            | (Value::Date(_) | Value::DateTime(_), Value::Date(_) | Value::DateTime(_)) => {
                self.compare(other) == Ordering::Equal
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object]"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// One row of raw data: an insertion-ordered list of named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Converts a JSON object into a record. Returns `None` for non-objects.
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        match Value::from(json) {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Top-level field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over top-level fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Sets a top-level field, keeping its position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Removes a top-level field.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(pos).1)
    }

    /// Resolves a dot-path such as `"Customer.Address.City"`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Writes a dot-path, creating intermediate objects as needed.
    ///
    /// An intermediate field that holds a non-object value is replaced.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) {
        match path.split_once('.') {
            None => self.set(path, value),
            Some((head, rest)) => {
                if !matches!(self.get(head), Some(Value::Object(_))) {
                    self.set(head, Record::new());
                }
                if let Some((_, Value::Object(child))) =
                    self.fields.iter_mut().find(|(k, _)| k == head)
                {
                    child.set_path(rest, value);
                }
            }
        }
    }

    /// Copies every field of `other` into `self`, overwriting on conflict.
    /// Nested objects are merged recursively.
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in other.iter() {
            match (self.get(key), value) {
                (Some(Value::Object(_)), Value::Object(patch)) => {
                    if let Some((_, Value::Object(child))) =
                        self.fields.iter_mut().find(|(k, _)| k == key)
                    {
                        child.merge(patch);
                    }
                }
                _ => self.set(key, value.clone()),
            }
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_path_get_and_set() {
        let mut record = Record::new().with("OrderID", 10248);
        record.set_path("ShipAddress.City", "Reims");
        record.set_path("ShipAddress.Country", "France");

        assert_eq!(
            record.get_path("ShipAddress.City"),
            Some(&Value::from("Reims"))
        );
        assert_eq!(record.get_path("ShipAddress.Zip"), None);
        assert_eq!(record.get_path("OrderID.Nested"), None);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["OrderID", "ShipAddress"]);
    }

    #[test]
    fn test_set_keeps_field_position() {
        let mut record = Record::new().with("a", 1).with("b", 2);
        record.set("a", 3);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&Value::Int(3)));
        assert_eq!(record.remove("a"), Some(Value::Int(3)));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_merge_is_recursive() {
        let mut base = Record::new().with("Freight", 10.0);
        base.set_path("Ship.City", "Reims");
        base.set_path("Ship.Country", "France");

        let mut patch = Record::new().with("Freight", 12.5);
        patch.set_path("Ship.City", "Lyon");
        base.merge(&patch);

        assert_eq!(base.get("Freight"), Some(&Value::Float(12.5)));
        assert_eq!(base.get_path("Ship.City"), Some(&Value::from("Lyon")));
        assert_eq!(base.get_path("Ship.Country"), Some(&Value::from("France")));
    }

    #[test]
    fn test_compare_mixed_numbers_and_nulls() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Null.compare(&Value::Int(0)), Ordering::Less);
        assert!(Value::Int(5).loosely_equals(&Value::Float(5.0)));
        assert!(!Value::Int(5).loosely_equals(&Value::from("5")));
    }

    #[test]
    fn test_nan_sorts_after_numbers() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan.compare(&Value::Float(1.0)), Ordering::Greater);
        assert_eq!(Value::Int(i64::MAX).compare(&nan), Ordering::Less);
        assert_eq!(nan.compare(&Value::Float(f64::NAN)), Ordering::Equal);

        let mut values = vec![
            Value::Float(3.0),
            nan.clone(),
            Value::Int(1),
            Value::Float(2.0),
            nan,
            Value::Float(0.5),
        ];
        values.sort_by(Value::compare);
        let finite: Vec<_> = values[..4].iter().filter_map(Value::as_float).collect();
        assert_eq!(finite, [0.5, 1.0, 2.0, 3.0]);
        assert!(values[4..].iter().all(|v| v.as_float().is_some_and(f64::is_nan)));
    }

    #[test]
    fn test_unrelated_types_order_by_rank() {
        let mut values = vec![Value::from("b"), Value::Int(3), Value::Bool(true), Value::Null];
        values.sort_by(Value::compare);
        assert_eq!(values, [Value::Null, Value::Bool(true), Value::Int(3), Value::from("b")]);
        assert_eq!(Value::from("a").compare(&Value::Float(f64::NAN)), Ordering::Greater);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({
            "OrderID": 10248,
            "Freight": 32.38,
            "Verified": true,
            "Customer": { "Name": "Vins et alcools" }
        });
        let record = Record::from_json(json).unwrap();
        assert_eq!(record.get("OrderID"), Some(&Value::Int(10248)));
        assert_eq!(record.get("Freight"), Some(&Value::Float(32.38)));
        assert_eq!(
            record.get_path("Customer.Name"),
            Some(&Value::from("Vins et alcools"))
        );
        assert!(Record::from_json(serde_json::json!([1, 2])).is_none());
    }
}
