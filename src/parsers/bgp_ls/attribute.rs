use std::{collections::HashMap, fmt::Display};

use once_cell::sync::Lazy;

/// Prefix shared by every GoBGP `Any` type URL.
pub const GOBGP_TYPE_URL_PREFIX: &str = "type.googleapis.com/gobgpapi.";

/// Wire form of the `Any` discriminator key.
pub const WIRE_TYPE_KEY: &str = "@type";

/// Canonical form of the discriminator key.
pub const TYPE_KEY: &str = "type";

/// BGP-LS attribute and NLRI kinds recognized by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Origin,
    AsPath,
    MultiExitDisc,
    LocalPref,
    LinkState,
    MpReachNlri,
    LsPrefixV4Nlri,
    LsLinkNlri,
    LsNodeNlri,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 9] = [
        AttributeKind::Origin,
        AttributeKind::AsPath,
        AttributeKind::MultiExitDisc,
        AttributeKind::LocalPref,
        AttributeKind::LinkState,
        AttributeKind::MpReachNlri,
        AttributeKind::LsPrefixV4Nlri,
        AttributeKind::LsLinkNlri,
        AttributeKind::LsNodeNlri,
    ];

    /// Semantic name used as the attribute key after normalization.
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Origin => "OriginAttribute",
            AttributeKind::AsPath => "AsPathAttribute",
            AttributeKind::MultiExitDisc => "MultiExitDiscAttribute",
            AttributeKind::LocalPref => "LocalPrefAttribute",
            AttributeKind::LinkState => "LsAttribute",
            AttributeKind::MpReachNlri => "MpReachNLRIAttribute",
            AttributeKind::LsPrefixV4Nlri => "LsPrefixV4NLRI",
            AttributeKind::LsLinkNlri => "LsLinkNLRI",
            AttributeKind::LsNodeNlri => "LsNodeNLRI",
        }
    }

    pub fn type_url(&self) -> String {
        format!("{}{}", GOBGP_TYPE_URL_PREFIX, self.name())
    }

    /// Resolves an opaque wire identifier. Unknown identifiers yield `None`.
    pub fn from_type_url(url: &str) -> Option<Self> {
        TYPE_URL_LOOKUP.get(url).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

static TYPE_URL_LOOKUP: Lazy<HashMap<String, AttributeKind>> = Lazy::new(|| {
    AttributeKind::ALL
        .into_iter()
        .map(|kind| (kind.type_url(), kind))
        .collect()
});

/// Discriminator of the inner NLRI of a path, after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NlriKind {
    Node,
    Link,
    PrefixV4,
    Other(String),
}

impl NlriKind {
    pub fn from_type_name(name: &str) -> Self {
        match AttributeKind::from_name(name) {
            Some(AttributeKind::LsNodeNlri) => NlriKind::Node,
            Some(AttributeKind::LsLinkNlri) => NlriKind::Link,
            Some(AttributeKind::LsPrefixV4Nlri) => NlriKind::PrefixV4,
            _ => NlriKind::Other(name.to_string()),
        }
    }
}

impl Display for NlriKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NlriKind::Node => write!(f, "{}", AttributeKind::LsNodeNlri),
            NlriKind::Link => write!(f, "{}", AttributeKind::LsLinkNlri),
            NlriKind::PrefixV4 => write!(f, "{}", AttributeKind::LsPrefixV4Nlri),
            NlriKind::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_resolves_from_its_type_url() {
        for kind in AttributeKind::ALL {
            assert_eq!(AttributeKind::from_type_url(&kind.type_url()), Some(kind));
        }
        assert_eq!(
            AttributeKind::from_type_url("type.googleapis.com/gobgpapi.LsAttribute"),
            Some(AttributeKind::LinkState)
        );
    }

    #[test]
    fn test_semantic_names_are_not_type_urls() {
        for kind in AttributeKind::ALL {
            assert_eq!(AttributeKind::from_type_url(kind.name()), None);
        }
        assert_eq!(
            AttributeKind::from_type_url("type.googleapis.com/gobgpapi.LsPrefixV6NLRI"),
            None
        );
    }

    #[test]
    fn test_nlri_kind_from_type_name() {
        assert_eq!(NlriKind::from_type_name("LsNodeNLRI"), NlriKind::Node);
        assert_eq!(NlriKind::from_type_name("LsLinkNLRI"), NlriKind::Link);
        assert_eq!(NlriKind::from_type_name("LsPrefixV4NLRI"), NlriKind::PrefixV4);
        assert_eq!(
            NlriKind::from_type_name("LsPrefixV6NLRI"),
            NlriKind::Other("LsPrefixV6NLRI".to_string())
        );
        assert_eq!(NlriKind::Link.to_string(), "LsLinkNLRI");
    }
}
