use crate::rule::{Rule, RuleKind};
use crate::Value;

/// A numeric reading of a raw value: numbers, or strings that parse as one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub(crate) fn read(raw: &Value) -> Option<Numeric> {
        match raw {
            Value::Int(i) => Some(Numeric::Int(*i)),
            Value::Float(f) if f.is_finite() => Some(Numeric::Float(*f)),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                match s.parse::<i64>() {
                    Ok(i) => Some(Numeric::Int(i)),
                    Err(_) => s.parse::<f64>().ok().filter(|f| f.is_finite()).map(Numeric::Float),
                }
            }
            _ => None,
        }
    }

    /// Truncates toward zero.
    pub(crate) fn to_i64(self) -> i64 {
        match self {
            Numeric::Int(i) => i,
            Numeric::Float(f) => f.trunc() as i64,
        }
    }

    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntRule;

impl Rule for IntRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Int
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        Numeric::read(raw).map(|n| Value::Int(n.to_i64()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FloatRule;

impl Rule for FloatRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Float
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        Numeric::read(raw).map(|n| Value::Float(n.to_f64()))
    }
}

/// A float rounded half away from zero to two decimal places.
#[derive(Debug, Clone, Copy)]
pub struct DecimalRule;

impl Rule for DecimalRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Decimal
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        Numeric::read(raw).map(|n| Value::Float((n.to_f64() * 100.0).round() / 100.0))
    }
}
