//! Identifier types for telmo.
//!
//! Accounts are keyed by phone number (MSISDN) and catalog plans by a
//! short plan identifier. Both are validated string newtypes that
//! serialize as plain strings on the wire and in storage keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of digits in an MSISDN (ITU-T E.164).
const MSISDN_MAX_DIGITS: usize = 15;

/// Minimum number of digits accepted for an MSISDN.
const MSISDN_MIN_DIGITS: usize = 6;

/// A subscriber phone number (MSISDN).
///
/// Accepts an optional leading `+` followed by 6 to 15 digits. The
/// canonical form preserves the input exactly, so `+221771234567` and
/// `221771234567` are distinct account keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Msisdn(String);

impl Msisdn {
    /// Return the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the bytes of the phone number, for key encoding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for Msisdn {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('+').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::InvalidMsisdn);
        }
        if digits.len() < MSISDN_MIN_DIGITS || digits.len() > MSISDN_MAX_DIGITS {
            return Err(IdError::InvalidMsisdn);
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Msisdn({})", self.0)
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Msisdn {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Msisdn> for String {
    fn from(id: Msisdn) -> Self {
        id.0
    }
}

/// A catalog plan identifier, e.g. `F_D_1GB`.
///
/// Plan IDs are assigned by the catalog owner. They must be non-empty
/// and limited to ASCII alphanumerics, `_` and `-`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanId(String);

impl PlanId {
    /// Return the plan identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the bytes of the identifier, for key encoding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for PlanId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty()
            || !s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(IdError::InvalidPlanId);
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlanId({})", self.0)
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PlanId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlanId> for String {
    fn from(id: PlanId) -> Self {
        id.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid phone number.
    #[error("invalid phone number: expected 6-15 digits with optional leading '+'")]
    InvalidMsisdn,

    /// The input is not a valid plan identifier.
    #[error("invalid plan id: expected non-empty [A-Za-z0-9_-]")]
    InvalidPlanId,
}
