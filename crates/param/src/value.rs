//! Dynamic parameter values.
//!
//! Every request parameter, whatever transport source it came from, is carried as a [`Value`].
//! Rules read raw `Value`s and produce normalized ones; the typed variants ([`Value::Id`],
//! [`Value::Date`], [`Value::File`]) only ever appear as the output of a rule.

use crate::{ObjectId, UploadedFile};
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A string keyed mapping of values, used for nested inputs and objects.
pub type Map = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
    Id(ObjectId),
    Date(DateTime<Utc>),
    File(UploadedFile),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Value::File(file) => Some(file),
            _ => None,
        }
    }

    /// Returns the non-empty string held by this value, if any.
    pub(crate) fn non_empty_str(&self) -> Option<&str> {
        self.as_str().filter(|s| !s.is_empty())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::Id(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<UploadedFile> for Value {
    fn from(value: UploadedFile) -> Self {
        Value::File(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Converts decoded json into a value. Numbers that fit an `i64` stay integers.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(object) => Value::Map(object.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

/// External json form: identifiers become hex strings, dates epoch seconds and files a descriptor object.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect()),
            Value::Map(map) => {
                serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), serde_json::Value::from(v))).collect())
            }
            Value::Id(id) => serde_json::Value::String(id.to_hex()),
            Value::Date(date) => serde_json::Value::from(date.timestamp()),
            Value::File(file) => file.to_json(),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut ser_map = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    ser_map.serialize_entry(key, value)?;
                }
                ser_map.end()
            }
            Value::Id(id) => serializer.serialize_str(&id.to_hex()),
            Value::Date(date) => serializer.serialize_i64(date.timestamp()),
            Value::File(file) => file.descriptor().serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn from_json_keeps_integers() {
        let json: serde_json::Value = serde_json::from_str(indoc! {r#"
        {
            "age": 42,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "nested": { "ok": true, "none": null }
        }
        "#})
        .unwrap();

        let value = Value::from(json);
        let map = value.as_map().unwrap();

        assert_eq!(map.get("age"), Some(&Value::Int(42)));
        assert_eq!(map.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(map.get("tags"), Some(&Value::List(vec!["a".into(), "b".into()])));

        let nested = map.get("nested").and_then(Value::as_map).unwrap();
        assert_eq!(nested.get("ok"), Some(&Value::Bool(true)));
        assert_eq!(nested.get("none"), Some(&Value::Null));
    }

    #[test]
    fn typed_variants_serialize_to_external_form() {
        let id: ObjectId = "507f1f77bcf86cd799439011".parse().unwrap();
        let date = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let value = Value::List(vec![Value::Id(id), Value::Date(date), Value::Null]);

        assert_eq!(serde_json::to_string(&value).unwrap(), r#"["507f1f77bcf86cd799439011",1700000000,null]"#);
        assert_eq!(serde_json::Value::from(&value), serde_json::json!(["507f1f77bcf86cd799439011", 1_700_000_000, null]));
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }
}
