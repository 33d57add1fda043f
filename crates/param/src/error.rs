use crate::RuleKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Invalid {} value", .kind.label())]
    Invalid { kind: RuleKind },

    #[error("unknown parameter type: {name}")]
    UnknownKind { name: String },
}

impl RuleError {
    pub fn invalid(kind: RuleKind) -> Self {
        Self::Invalid { kind }
    }

    pub fn unknown_kind<S: ToString>(name: S) -> Self {
        Self::UnknownKind { name: name.to_string() }
    }
}
