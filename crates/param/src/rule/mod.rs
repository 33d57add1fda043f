//! Sanitize, validate and export rules, one per semantic parameter type.
//!
//! A [`Rule`] is a set of pure functions over [`Value`]:
//!
//! - `sanitize` coerces raw input on a best-effort basis and answers `None` for input it cannot
//!   interpret. It never fails.
//! - `validate` sanitizes both the raw value and the declared default, then applies the
//!   requiredness and default-substitution policy. It is the only operation that errors.
//! - `export` produces the external representation of a value. Exporting an exported value
//!   yields the same representation.
//!
//! The set of rules is closed: [`RuleKind`] enumerates every type and resolves to its rule with a
//! plain `match`, so a parameter type is checked once, when it is declared.

mod boolean;
mod date;
mod file;
mod number;
mod object_id;
mod structure;
mod text;

pub use boolean::BoolRule;
pub use date::{DateRule, TimestampRule};
pub use file::FileRule;
pub use number::{DecimalRule, FloatRule, IntRule};
pub use object_id::{ObjectIdListRule, ObjectIdRule};
pub use structure::{ObjectRule, VectorRule};
pub use text::{EmailRule, FidRule, StringListRule, UrlRule};

use crate::{RuleError, Value};
use std::fmt;
use std::str::FromStr;

pub trait Rule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn sanitize(&self, raw: &Value) -> Option<Value>;

    fn export(&self, value: &Value) -> Option<Value> {
        self.sanitize(value)
    }

    /// Sanitizes `raw` and `default`, then decides:
    ///
    /// | raw  | default | required | result            |
    /// |------|---------|----------|-------------------|
    /// | none | none    | yes      | error             |
    /// | none | none    | no       | `None`            |
    /// | none | some    | -        | default, if `use_default` |
    /// | some | -       | -        | raw               |
    fn validate(&self, raw: &Value, required: bool, default: &Value, use_default: bool) -> Result<Option<Value>, RuleError> {
        let default = self.sanitize(default);
        let value = self.sanitize(raw);

        match (value, default) {
            (None, None) if required => Err(RuleError::invalid(self.kind())),
            (None, None) => Ok(None),
            (None, Some(default)) if use_default => Ok(Some(default)),
            (value, _) => Ok(value),
        }
    }
}

/// Every parameter type the framework knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Bool,
    Int,
    Float,
    Decimal,
    Email,
    Url,
    /// free-form identifier string
    Fid,
    StringList,
    ObjectId,
    ObjectIdList,
    Object,
    Vector,
    Date,
    Timestamp,
    File,
}

impl RuleKind {
    pub const ALL: [RuleKind; 15] = [
        RuleKind::Bool,
        RuleKind::Int,
        RuleKind::Float,
        RuleKind::Decimal,
        RuleKind::Email,
        RuleKind::Url,
        RuleKind::Fid,
        RuleKind::StringList,
        RuleKind::ObjectId,
        RuleKind::ObjectIdList,
        RuleKind::Object,
        RuleKind::Vector,
        RuleKind::Date,
        RuleKind::Timestamp,
        RuleKind::File,
    ];

    /// Resolves the rule implementing this kind.
    pub fn rule(self) -> &'static dyn Rule {
        match self {
            RuleKind::Bool => &BoolRule,
            RuleKind::Int => &IntRule,
            RuleKind::Float => &FloatRule,
            RuleKind::Decimal => &DecimalRule,
            RuleKind::Email => &EmailRule,
            RuleKind::Url => &UrlRule,
            RuleKind::Fid => &FidRule,
            RuleKind::StringList => &StringListRule,
            RuleKind::ObjectId => &ObjectIdRule,
            RuleKind::ObjectIdList => &ObjectIdListRule,
            RuleKind::Object => &ObjectRule,
            RuleKind::Vector => &VectorRule,
            RuleKind::Date => &DateRule,
            RuleKind::Timestamp => &TimestampRule,
            RuleKind::File => &FileRule,
        }
    }

    /// The name used to declare a parameter of this type.
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Bool => "bool",
            RuleKind::Int => "int",
            RuleKind::Float => "float",
            RuleKind::Decimal => "decimal",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Fid => "fid",
            RuleKind::StringList => "string_list",
            RuleKind::ObjectId => "object_id",
            RuleKind::ObjectIdList => "object_id_list",
            RuleKind::Object => "object",
            RuleKind::Vector => "vector",
            RuleKind::Date => "date",
            RuleKind::Timestamp => "timestamp",
            RuleKind::File => "file",
        }
    }

    /// Human label used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Bool => "boolean",
            RuleKind::Int => "integer",
            RuleKind::Float => "float",
            RuleKind::Decimal => "decimal",
            RuleKind::Email => "email",
            RuleKind::Url => "URL",
            RuleKind::Fid => "FID",
            RuleKind::StringList => "string",
            RuleKind::ObjectId | RuleKind::ObjectIdList => "ID",
            RuleKind::Object => "object",
            RuleKind::Vector => "vector",
            RuleKind::Date => "date",
            RuleKind::Timestamp => "timestamp",
            RuleKind::File => "file",
        }
    }

    pub fn sanitize(self, raw: &Value) -> Option<Value> {
        self.rule().sanitize(raw)
    }

    pub fn export(self, value: &Value) -> Option<Value> {
        self.rule().export(value)
    }

    pub fn validate(self, raw: &Value, required: bool, default: &Value, use_default: bool) -> Result<Option<Value>, RuleError> {
        self.rule().validate(raw, required, default, use_default)
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RuleError::unknown_kind(s))
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_resolves_to_its_own_rule() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.rule().kind(), kind);
            assert_eq!(kind.name().parse::<RuleKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Object_Id".parse::<RuleKind>().unwrap(), RuleKind::ObjectId);
        assert_eq!("money".parse::<RuleKind>(), Err(RuleError::unknown_kind("money")));
    }

    #[test]
    fn validate_policy() {
        let kind = RuleKind::Int;

        assert_eq!(kind.validate(&Value::Null, true, &Value::Null, true), Err(RuleError::invalid(kind)));
        assert_eq!(kind.validate(&Value::Null, false, &Value::Null, true), Ok(None));
        assert_eq!(kind.validate(&Value::Null, true, &Value::Int(7), true), Ok(Some(Value::Int(7))));
        assert_eq!(kind.validate(&Value::Null, false, &Value::Int(7), false), Ok(None));
        assert_eq!(kind.validate(&"12".into(), true, &Value::Int(7), true), Ok(Some(Value::Int(12))));
        assert_eq!(kind.validate(&"abc".into(), false, &"8".into(), true), Ok(Some(Value::Int(8))));
    }

    #[test]
    fn error_message_names_the_type() {
        assert_eq!(RuleError::invalid(RuleKind::Bool).to_string(), "Invalid boolean value");
        assert_eq!(RuleError::invalid(RuleKind::ObjectIdList).to_string(), "Invalid ID value");
    }

    /// Exporting an exported value must not change it.
    #[test]
    fn export_is_idempotent() {
        let samples: Vec<(RuleKind, Value)> = vec![
            (RuleKind::Bool, "Yes".into()),
            (RuleKind::Int, "12.9".into()),
            (RuleKind::Float, "3.25".into()),
            (RuleKind::Decimal, Value::Float(10.005)),
            (RuleKind::Email, " someone@example.com ".into()),
            (RuleKind::Url, "https://example.com/a b".into()),
            (RuleKind::Fid, " a &amp; b ".into()),
            (RuleKind::Fid, "&amp;amp;lt;".into()),
            (RuleKind::StringList, "a, b,,c".into()),
            (RuleKind::StringList, "&amp;amp;lt;, b".into()),
            (RuleKind::ObjectId, "507f1f77bcf86cd799439011".into()),
            (RuleKind::ObjectIdList, "507f1f77bcf86cd799439011,nope,507f191e810c19729de860ea".into()),
            (RuleKind::Object, Value::List(vec![1.into(), 2.into()])),
            (RuleKind::Vector, Value::List(vec![Value::List(vec![]), "x".into()])),
            (RuleKind::Date, "2024-02-29T12:00:00Z".into()),
            (RuleKind::Timestamp, "2024-02-29".into()),
        ];

        for (kind, raw) in samples {
            let sanitized = kind.sanitize(&raw).unwrap_or_else(|| panic!("{kind} should sanitize {raw:?}"));
            let exported = kind.export(&sanitized).unwrap();
            assert_eq!(kind.export(&exported), Some(exported.clone()), "{kind} export is not idempotent");
        }
    }
}
