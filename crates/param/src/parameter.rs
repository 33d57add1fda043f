use crate::{RuleError, RuleKind, Source, Value};

/// A named slot declared by a controller: its type, default, requiredness and current value.
///
/// The value exposed by [`Parameter::value`] has always been through the rule's sanitize step;
/// the raw input is kept aside so [`Parameter::validate`] can apply the default policy to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    kind: RuleKind,
    raw: Value,
    value: Value,
    source: Source,
    required: bool,
    default: Value,
}

impl Parameter {
    pub fn new(kind: RuleKind) -> Self {
        Self { kind, raw: Value::Null, value: Value::Null, source: Source::Unset, required: false, default: Value::Null }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Assigns a raw value and records where it came from.
    pub fn set(&mut self, raw: impl Into<Value>, source: Source) -> &mut Self {
        self.raw = raw.into();
        self.value = self.kind.sanitize(&self.raw).unwrap_or_default();
        self.source = source;
        self
    }

    /// Runs the rule's validation, replacing the value with the validated one.
    pub fn validate(&mut self) -> Result<&mut Self, RuleError> {
        self.value = self.kind.validate(&self.raw, self.required, &self.default, true)?.unwrap_or_default();
        Ok(self)
    }

    pub fn export(&self) -> Value {
        self.kind.export(&self.value).unwrap_or_default()
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> &Value {
        &self.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_sanitizes_immediately() {
        let mut parameter = Parameter::new(RuleKind::Int);
        parameter.set(" 7 ", Source::Query);

        assert_eq!(parameter.value(), &Value::Int(7));
        assert_eq!(parameter.source(), Source::Query);
    }

    #[test]
    fn validate_substitutes_default() {
        let mut parameter = Parameter::new(RuleKind::Bool).with_default("yes");
        parameter.set("maybe", Source::Form);
        assert_eq!(parameter.value(), &Value::Null);

        parameter.validate().unwrap();
        assert_eq!(parameter.value(), &Value::Bool(true));
    }

    #[test]
    fn required_without_value_fails() {
        let mut parameter = Parameter::new(RuleKind::Email).required();
        parameter.set(Value::Null, Source::Unset);

        assert_eq!(parameter.validate().map(|p| p.value().clone()), Err(RuleError::invalid(RuleKind::Email)));
    }

    #[test]
    fn export_uses_rule() {
        let mut parameter = Parameter::new(RuleKind::ObjectId);
        parameter.set("507f1f77bcf86cd799439011", Source::Url).validate().unwrap();

        assert_eq!(parameter.export(), Value::from("507f1f77bcf86cd799439011"));
    }

    #[test]
    fn fid_entities_decode_once() {
        let mut parameter = Parameter::new(RuleKind::Fid);
        parameter.set("&amp;lt;b&amp;gt;", Source::Query).validate().unwrap();

        assert_eq!(parameter.value(), &Value::from("&lt;b&gt;"));
        assert_eq!(parameter.export(), Value::from("&lt;b&gt;"));
    }
}
