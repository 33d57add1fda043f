use crate::rule::number::Numeric;
use crate::rule::{Rule, RuleKind};
use crate::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Reads an instant from epoch seconds, a `{"sec": ..}` object or a date string.
fn read_instant(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Date(date) => Some(*date),
        Value::Map(map) => map.get("sec").and_then(from_seconds),
        Value::String(s) => from_seconds(raw).or_else(|| parse_date(s.trim())),
        _ => from_seconds(raw),
    }
}

fn from_seconds(raw: &Value) -> Option<DateTime<Utc>> {
    Numeric::read(raw).and_then(|n| DateTime::from_timestamp(n.to_i64(), 0))
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(s) {
        return Some(date.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(s, format) {
            return Some(date.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|d| d.and_utc())
}

/// A point in time. Exports as epoch seconds.
#[derive(Debug, Clone, Copy)]
pub struct DateRule;

impl Rule for DateRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Date
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        read_instant(raw).map(Value::Date)
    }

    fn export(&self, value: &Value) -> Option<Value> {
        read_instant(value).map(|date| Value::Int(date.timestamp()))
    }
}

/// Epoch seconds as an integer.
#[derive(Debug, Clone, Copy)]
pub struct TimestampRule;

impl Rule for TimestampRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Timestamp
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        read_instant(raw).map(|date| Value::Int(date.timestamp()))
    }
}
