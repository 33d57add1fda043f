use crate::rule::{Rule, RuleKind};
use crate::value::Map;
use crate::Value;

/// A non-empty object. Sequences are keyed by their index.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRule;

impl Rule for ObjectRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Object
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        let map: Map = match raw {
            Value::Map(map) => map.clone(),
            Value::List(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v.clone())).collect(),
            _ => return None,
        };
        (!map.is_empty()).then_some(Value::Map(map))
    }
}

/// A nested structure of sequences and objects with every empty container pruned.
#[derive(Debug, Clone, Copy)]
pub struct VectorRule;

impl VectorRule {
    fn vectorify(value: &Value) -> Value {
        match value {
            Value::List(items) if items.is_empty() => Value::Null,
            Value::Map(map) if map.is_empty() => Value::Null,
            Value::List(items) => Value::List(items.iter().map(Self::vectorify).collect()),
            Value::Map(map) => Value::Map(map.iter().map(|(k, v)| (k.clone(), Self::vectorify(v))).collect()),
            other => other.clone(),
        }
    }
}

impl Rule for VectorRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Vector
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        match raw {
            Value::List(_) | Value::Map(_) => Some(Self::vectorify(raw)).filter(|v| !v.is_null()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_from_list() {
        let sanitized = ObjectRule.sanitize(&Value::List(vec!["a".into(), "b".into()])).unwrap();
        let map = sanitized.as_map().unwrap();
        assert_eq!(map.get("0"), Some(&"a".into()));
        assert_eq!(map.get("1"), Some(&"b".into()));
    }

    #[test]
    fn empty_object_is_null() {
        assert_eq!(ObjectRule.sanitize(&Value::Map(Map::new())), None);
        assert_eq!(ObjectRule.sanitize(&"x".into()), None);
    }

    #[test]
    fn vector_prunes_empty_containers() {
        let mut inner = Map::new();
        inner.insert("empty".into(), Value::List(vec![]));
        inner.insert("keep".into(), Value::Int(1));
        let raw = Value::List(vec![Value::Map(inner), Value::Map(Map::new())]);

        let mut expected_inner = Map::new();
        expected_inner.insert("empty".into(), Value::Null);
        expected_inner.insert("keep".into(), Value::Int(1));

        assert_eq!(VectorRule.sanitize(&raw), Some(Value::List(vec![Value::Map(expected_inner), Value::Null])));
        assert_eq!(VectorRule.sanitize(&Value::List(vec![])), None);
    }
}
