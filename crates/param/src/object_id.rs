use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 12-byte document identifier, written as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ObjectId::LEN]);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjectIdError {
    #[error("invalid object id: {source}")]
    InvalidHex {
        #[from]
        source: hex::FromHexError,
    },
}

impl ObjectId {
    pub const LEN: usize = 12;

    pub const fn from_bytes(bytes: [u8; ObjectId::LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; ObjectId::LEN] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 24 character hex string, either case.
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        let mut bytes = [0u8; ObjectId::LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let id = ObjectId::parse_str("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
        assert_eq!(id.bytes()[0], 0x50);
    }

    #[test]
    fn reject_bad_input() {
        assert!(ObjectId::parse_str("507f1f77bcf86cd79943901").is_err());
        assert!(ObjectId::parse_str("507f1f77bcf86cd79943901z").is_err());
        assert!(ObjectId::parse_str("").is_err());
    }
}
