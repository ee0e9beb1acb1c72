//! Key-derivation identifiers: security levels, protocols, counterparties.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How strictly a protocol's derived keys are guarded.
///
/// Serialized as the bare integer (`0`, `1`, `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    /// No permission is ever required.
    Silent = 0,
    /// Permission is granted per application, for every counterparty.
    App = 1,
    /// Permission is granted per application and per counterparty.
    Counterparty = 2,
}

impl TryFrom<u8> for SecurityLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Silent),
            1 => Ok(Self::App),
            2 => Ok(Self::Counterparty),
            other => Err(format!("invalid security level {other}, expected 0, 1 or 2")),
        }
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> Self {
        level as u8
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// A protocol identifier: security level plus protocol name.
///
/// Serialized as the two-element array `[level, "name"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(SecurityLevel, String)", into = "(SecurityLevel, String)")]
pub struct Protocol {
    pub security_level: SecurityLevel,
    pub name: String,
}

impl Protocol {
    pub fn new(security_level: SecurityLevel, name: impl Into<String>) -> Self {
        Self {
            security_level,
            name: name.into(),
        }
    }
}

impl From<(SecurityLevel, String)> for Protocol {
    fn from((security_level, name): (SecurityLevel, String)) -> Self {
        Self {
            security_level,
            name,
        }
    }
}

impl From<Protocol> for (SecurityLevel, String) {
    fn from(protocol: Protocol) -> Self {
        (protocol.security_level, protocol.name)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.security_level, self.name)
    }
}

/// The other party a key is derived for.
///
/// Serialized as `"self"`, `"anyone"`, or the counterparty's public key hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Counterparty {
    Myself,
    Anyone,
    Other(String),
}

impl From<String> for Counterparty {
    fn from(value: String) -> Self {
        match value.as_str() {
            "self" => Self::Myself,
            "anyone" => Self::Anyone,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Counterparty {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Counterparty> for String {
    fn from(counterparty: Counterparty) -> Self {
        counterparty.to_string()
    }
}

impl fmt::Display for Counterparty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counterparty::Myself => f.write_str("self"),
            Counterparty::Anyone => f.write_str("anyone"),
            Counterparty::Other(key) => f.write_str(key),
        }
    }
}
