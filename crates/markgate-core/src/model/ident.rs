// ── Network identity types ──
//
// MacAddress is the identity key of every device record; the validators
// are pure syntax checks used both on inbound input and on persisted
// values. Neither touches the network.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

// ── Validators ──────────────────────────────────────────────────────

/// Check that `s` is six colon-separated 2-digit hexadecimal octets
/// (case-insensitive), e.g. `00:11:22:aa:bb:cc`.
pub fn validate_mac(s: &str) -> Result<(), CoreError> {
    let mut octets = 0usize;
    for part in s.split(':') {
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidMac { value: s.to_owned() });
        }
        octets += 1;
    }
    if octets != 6 {
        return Err(CoreError::InvalidMac { value: s.to_owned() });
    }
    Ok(())
}

/// Check that `s` is a dotted-quad IPv4 address with each octet in
/// `[0, 255]`.
pub fn validate_ipv4(s: &str) -> Result<(), CoreError> {
    parse_ipv4(s).map(|_| ())
}

/// Parse a dotted-quad IPv4 address, rejecting out-of-range octets and
/// non-standard forms.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr, CoreError> {
    s.parse()
        .map_err(|_| CoreError::InvalidIp { value: s.to_owned() })
}

// ── MacAddress ──────────────────────────────────────────────────────

/// A validated MAC address, normalized to lowercase colon-separated
/// form (`aa:bb:cc:dd:ee:ff`). Construction goes through [`MacAddress::parse`],
/// so a held value is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Validate and normalize a MAC address string.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        validate_mac(raw)?;
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Deserialization re-validates, keeping the well-formedness invariant
// for records that come back from serialized state.
impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
