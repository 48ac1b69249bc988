//! AMS net id target addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing an [`AmsNetId`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNetIdError {
    /// The string does not have exactly six dot-separated octets.
    #[error("expected 6 dot-separated octets, got {0}")]
    OctetCount(usize),

    /// An octet is not a decimal number in 0..=255.
    #[error("invalid octet '{0}'")]
    InvalidOctet(String),
}

/// The six-octet net id identifying an MDP target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AmsNetId([u8; 6]);

impl AmsNetId {
    /// The loopback net id of the local device.
    pub const LOCAL: AmsNetId = AmsNetId([127, 0, 0, 1, 1, 1]);

    pub const fn new(octets: [u8; 6]) -> Self {
        AmsNetId(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Whether this net id addresses the local device.
    pub fn is_local(&self) -> bool {
        *self == Self::LOCAL
    }
}

impl FromStr for AmsNetId {
    type Err = ParseNetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 6 {
            return Err(ParseNetIdError::OctetCount(parts.len()));
        }

        let mut octets = [0u8; 6];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u8>()
                .map_err(|_| ParseNetIdError::InvalidOctet(part.to_string()))?;
        }

        Ok(AmsNetId(octets))
    }
}

impl fmt::Display for AmsNetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a}.{b}.{c}.{d}.{e}.{g}")
    }
}

impl TryFrom<String> for AmsNetId {
    type Error = ParseNetIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AmsNetId> for String {
    fn from(id: AmsNetId) -> String {
        id.to_string()
    }
}
