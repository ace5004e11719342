// ── Link-layer address ──
//
// The MAC address is the identity of an access point for the whole
// responder: its separator-free form is the merge key across categories
// and the `node_id` the map uses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MAC address in colon-separated form.
///
/// Dashes are normalized to colons; case is kept as the provider reported
/// it, so the derived node id matches what the controller shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a MAC address from colon- or dash-separated text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().replace('-', ":"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address with separators stripped (`aabbccddeeff`).
    pub fn node_id(&self) -> String {
        self.0.chars().filter(|c| *c != ':').collect()
    }

    /// Case-insensitive comparison against raw text from an API payload.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(&other.trim().replace('-', ":"))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for MacAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
