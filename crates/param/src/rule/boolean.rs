use crate::rule::{Rule, RuleKind};
use crate::Value;

/// Accepts booleans, `0`/`1` and the usual words (`true/false`, `on/off`, `yes/no`) in any case.
#[derive(Debug, Clone, Copy)]
pub struct BoolRule;

impl Rule for BoolRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Bool
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        let flag = match raw {
            Value::Bool(b) => *b,
            Value::Int(0) => false,
            Value::Int(1) => true,
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => true,
                "false" | "off" | "no" | "0" => false,
                _ => return None,
            },
            _ => return None,
        };
        Some(Value::Bool(flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_inputs_normalize_the_same() {
        let expected = Some(Value::Bool(true));
        assert_eq!(BoolRule.sanitize(&"Yes".into()), expected);
        assert_eq!(BoolRule.sanitize(&Value::Int(1)), expected);
        assert_eq!(BoolRule.sanitize(&Value::Bool(true)), expected);
        assert_eq!(BoolRule.sanitize(&"ON".into()), expected);
    }

    #[test]
    fn falsy_inputs() {
        assert_eq!(BoolRule.sanitize(&"off".into()), Some(Value::Bool(false)));
        assert_eq!(BoolRule.sanitize(&"0".into()), Some(Value::Bool(false)));
        assert_eq!(BoolRule.sanitize(&Value::Int(0)), Some(Value::Bool(false)));
    }

    #[test]
    fn unknown_inputs() {
        assert_eq!(BoolRule.sanitize(&"maybe".into()), None);
        assert_eq!(BoolRule.sanitize(&Value::Int(2)), None);
        assert_eq!(BoolRule.sanitize(&Value::Null), None);
    }
}
