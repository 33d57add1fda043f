use crate::rule::text::collection;
use crate::rule::{Rule, RuleKind};
use crate::{ObjectId, Value};

/// A document identifier. Exports as its hex string.
#[derive(Debug, Clone, Copy)]
pub struct ObjectIdRule;

impl ObjectIdRule {
    fn read(raw: &Value) -> Option<ObjectId> {
        match raw {
            Value::Id(id) => Some(*id),
            Value::String(s) => ObjectId::parse_str(s.trim()).ok(),
            _ => None,
        }
    }
}

impl Rule for ObjectIdRule {
    fn kind(&self) -> RuleKind {
        RuleKind::ObjectId
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        Self::read(raw).map(Value::Id)
    }

    fn export(&self, value: &Value) -> Option<Value> {
        Self::read(value).map(|id| Value::String(id.to_hex()))
    }
}

/// A list of identifiers, as a sequence or a comma separated string. Unparseable items are dropped.
#[derive(Debug, Clone, Copy)]
pub struct ObjectIdListRule;

impl ObjectIdListRule {
    fn read(raw: &Value) -> Option<Vec<ObjectId>> {
        let ids: Vec<ObjectId> = collection(raw).iter().filter_map(ObjectIdRule::read).collect();
        (!ids.is_empty()).then_some(ids)
    }
}

impl Rule for ObjectIdListRule {
    fn kind(&self) -> RuleKind {
        RuleKind::ObjectIdList
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        Self::read(raw).map(|ids| Value::List(ids.into_iter().map(Value::Id).collect()))
    }

    fn export(&self, value: &Value) -> Option<Value> {
        Self::read(value).map(|ids| Value::List(ids.into_iter().map(|id| Value::String(id.to_hex())).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "507f1f77bcf86cd799439011";

    #[test]
    fn single_id() {
        let id = ObjectId::parse_str(ID).unwrap();
        assert_eq!(ObjectIdRule.sanitize(&ID.into()), Some(Value::Id(id)));
        assert_eq!(ObjectIdRule.export(&Value::Id(id)), Some(ID.into()));
        assert_eq!(ObjectIdRule.sanitize(&"42".into()), None);
        assert_eq!(ObjectIdRule.sanitize(&Value::Int(42)), None);
    }

    #[test]
    fn id_list_drops_bad_items() {
        let raw = Value::from(format!("{ID}, nope ,{ID}"));
        let id = ObjectId::parse_str(ID).unwrap();

        assert_eq!(ObjectIdListRule.sanitize(&raw), Some(Value::List(vec![Value::Id(id), Value::Id(id)])));
        assert_eq!(ObjectIdListRule.export(&raw), Some(Value::List(vec![ID.into(), ID.into()])));
        assert_eq!(ObjectIdListRule.sanitize(&"nope".into()), None);
    }
}
