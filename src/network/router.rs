use std::{borrow::Borrow, fmt::Display};

use serde::{Deserialize, Serialize};

/// IGP router identifier as advertised in the BGP-LS node descriptor
/// (an IS-IS system ID or an OSPF router ID). Used verbatim as the graph key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouterId(String);

impl RouterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RouterId {
    fn from(value: &str) -> Self {
        RouterId(value.to_string())
    }
}

impl From<String> for RouterId {
    fn from(value: String) -> Self {
        RouterId(value)
    }
}

impl Borrow<str> for RouterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for RouterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
