use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::parsers::bgp_ls::attribute::{AttributeKind, NlriKind};

/// A best-path entry of the BGP-LS table after normalization.
///
/// `nlri` keeps its wire nesting (`nlri.nlri.type`, `nlri.nlri.localNode`, ...),
/// `pattrs` is keyed by semantic attribute name, and every other field of the
/// path is carried through untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub nlri: Value,
    pub pattrs: Map<String, Value>,
    /// IGP metric of the link, lifted from `pattrs.LsAttribute.link.igpMetric`.
    #[serde(rename = "igpMetric", default, skip_serializing_if = "Option::is_none")]
    pub igp_metric: Option<u32>,
    /// Display name of the node, the advertised hostname or the IGP router ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NormalizedRecord {
    /// The inner NLRI object (`nlri.nlri`).
    pub fn inner_nlri(&self) -> Option<&Map<String, Value>> {
        self.nlri.get("nlri").and_then(Value::as_object)
    }

    pub fn nlri_type(&self) -> Option<&str> {
        self.inner_nlri()?.get("type")?.as_str()
    }

    pub fn nlri_kind(&self) -> NlriKind {
        self.nlri_type()
            .map(NlriKind::from_type_name)
            .unwrap_or_else(|| NlriKind::Other(String::new()))
    }

    pub fn local_router_id(&self) -> Option<&str> {
        self.router_id_of("localNode")
    }

    pub fn remote_router_id(&self) -> Option<&str> {
        self.router_id_of("remoteNode")
    }

    fn router_id_of(&self, descriptor: &str) -> Option<&str> {
        self.inner_nlri()?
            .get(descriptor)?
            .get("igpRouterId")?
            .as_str()
    }

    pub fn attribute(&self, kind: AttributeKind) -> Option<&Value> {
        self.pattrs.get(kind.name())
    }

    /// Stable identity of the record, derived from its canonical JSON form.
    pub fn identity(&self) -> Result<Uuid, serde_json::Error> {
        // Map keys are sorted, so the serialization is canonical.
        let bytes = serde_json::to_vec(self)?;
        Ok(Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn link_record() -> NormalizedRecord {
        serde_json::from_value(json!(
            {
                "nlri": {
                    "type": "LS_NLRI_LINK",
                    "nlri": {
                        "type": "LsLinkNLRI",
                        "localNode": { "igpRouterId": "0000.0000.0001" },
                        "remoteNode": { "igpRouterId": "0000.0000.0002" }
                    }
                },
                "pattrs": {
                    "LsAttribute": { "link": { "igpMetric": 10 } }
                },
                "igpMetric": 10,
                "best": true,
                "neighborIp": "10.0.0.1"
            }
        ))
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let record = link_record();
        assert_eq!(record.nlri_kind(), NlriKind::Link);
        assert_eq!(record.local_router_id(), Some("0000.0000.0001"));
        assert_eq!(record.remote_router_id(), Some("0000.0000.0002"));
        assert_eq!(record.igp_metric, Some(10));
        assert!(record.attribute(AttributeKind::LinkState).is_some());
        assert!(record.attribute(AttributeKind::Origin).is_none());
        assert_eq!(record.fields.get("best"), Some(&json!(true)));
    }

    #[test]
    fn test_serializes_flat() {
        let value = serde_json::to_value(link_record()).unwrap();
        assert_eq!(value["igpMetric"], json!(10));
        assert_eq!(value["neighborIp"], json!("10.0.0.1"));
        assert!(value.get("name").is_none());
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn test_identity_is_v5_of_canonical_json() {
        let record = link_record();
        let bytes = serde_json::to_vec(&record).unwrap();

        assert_eq!(record.identity().unwrap(), Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes));
        assert_ne!(record.identity().unwrap(), Uuid::new_v5(&Uuid::NAMESPACE_OID, b""));
    }

    #[test]
    fn test_identity_tracks_content() {
        let a = link_record();
        let mut b = link_record();
        assert_eq!(a.identity().unwrap(), b.identity().unwrap());

        b.igp_metric = Some(1);
        assert_ne!(a.identity().unwrap(), b.identity().unwrap());
    }
}
