use crate::rule::number::Numeric;
use crate::rule::{Rule, RuleKind};
use crate::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

#[derive(Debug, Clone, Copy)]
pub struct EmailRule;

impl Rule for EmailRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Email
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        let email = raw.non_empty_str()?.trim();
        EMAIL.is_match(email).then(|| Value::String(email.to_owned()))
    }
}

/// Strips every character that may not appear in a url.
#[derive(Debug, Clone, Copy)]
pub struct UrlRule;

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=".contains(c)
}

impl Rule for UrlRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Url
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        let url: String = raw.non_empty_str()?.chars().filter(|c| is_url_char(*c)).collect();
        (!url.is_empty()).then_some(Value::String(url))
    }
}

/// Free-form identifier: a trimmed, entity-decoded string. Numbers are accepted as their text.
#[derive(Debug, Clone, Copy)]
pub struct FidRule;

impl Rule for FidRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Fid
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        text_item(raw).map(Value::String)
    }

    /// Entities are decoded once on the way in, never again on the way out.
    fn export(&self, value: &Value) -> Option<Value> {
        plain_item(value).map(Value::String)
    }
}

/// A list of strings, given either as a sequence or as one comma separated string.
#[derive(Debug, Clone, Copy)]
pub struct StringListRule;

impl Rule for StringListRule {
    fn kind(&self) -> RuleKind {
        RuleKind::StringList
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        let items: Vec<Value> = collection(raw).iter().filter_map(text_item).map(Value::String).collect();
        (!items.is_empty()).then_some(Value::List(items))
    }

    fn export(&self, value: &Value) -> Option<Value> {
        let items: Vec<Value> = collection(value).iter().filter_map(plain_item).map(Value::String).collect();
        (!items.is_empty()).then_some(Value::List(items))
    }
}

/// Splits a raw value into list items: sequences as-is, strings on commas, anything else alone.
pub(crate) fn collection(raw: &Value) -> Vec<Value> {
    match raw {
        Value::List(items) => items.clone(),
        Value::String(s) => s.split(',').map(Value::from).collect(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn text_item(raw: &Value) -> Option<String> {
    plain_item(raw).map(|text| decode_entities(&text))
}

/// A trimmed, non-empty string item; numbers become their text.
fn plain_item(raw: &Value) -> Option<String> {
    let text = match raw {
        Value::String(s) => s.trim().to_owned(),
        Value::Int(_) | Value::Float(_) => match Numeric::read(raw)? {
            Numeric::Int(i) => i.to_string(),
            Numeric::Float(f) => f.to_string(),
        },
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Reverses html special character escaping.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email() {
        assert_eq!(EmailRule.sanitize(&" a.b+c@example.co.uk ".into()), Some("a.b+c@example.co.uk".into()));
        assert_eq!(EmailRule.sanitize(&"no-at-sign.example.com".into()), None);
        assert_eq!(EmailRule.sanitize(&"user@localhost".into()), None);
        assert_eq!(EmailRule.sanitize(&"".into()), None);
        assert_eq!(EmailRule.sanitize(&Value::Int(1)), None);
    }

    #[test]
    fn url_filters_characters() {
        assert_eq!(UrlRule.sanitize(&"https://example.com/a b?c=d".into()), Some("https://example.com/ab?c=d".into()));
        assert_eq!(UrlRule.sanitize(&"   ".into()), None);
    }

    #[test]
    fn fid() {
        assert_eq!(FidRule.sanitize(&"  Tom &amp; Jerry &lt;3 ".into()), Some("Tom & Jerry <3".into()));
        assert_eq!(FidRule.sanitize(&Value::Int(77)), Some("77".into()));
        assert_eq!(FidRule.sanitize(&"   ".into()), None);
        assert_eq!(FidRule.sanitize(&Value::Bool(true)), None);
    }

    #[test]
    fn fid_export_keeps_decoded_text() {
        let stored = FidRule.sanitize(&"&amp;lt;".into()).unwrap();
        assert_eq!(stored, Value::from("&lt;"));
        assert_eq!(FidRule.export(&stored), Some("&lt;".into()));
        assert_eq!(FidRule.export(&Value::Int(5)), Some("5".into()));
    }

    #[test]
    fn string_list() {
        let expected = Some(Value::List(vec!["a".into(), "b".into(), "3".into()]));
        assert_eq!(StringListRule.sanitize(&"a, b,,3".into()), expected);
        assert_eq!(StringListRule.sanitize(&Value::List(vec!["a".into(), " b ".into(), Value::Int(3), Value::Null])), expected);
        assert_eq!(StringListRule.sanitize(&",,".into()), None);
    }

    #[test]
    fn string_list_export_keeps_decoded_text() {
        let stored = StringListRule.sanitize(&"&amp;lt;, b".into()).unwrap();
        assert_eq!(StringListRule.export(&stored), Some(Value::List(vec!["&lt;".into(), "b".into()])));
    }
}
