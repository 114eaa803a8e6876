/*!
This module defines structs that can be deserialized from the BGP-LS table as
returned by a GoBGP `ListPath` call (rendered with the protobuf JSON mapping),
or from a static fixture holding the same data.

They are consumed once by the normalizer and never exposed to readers.
*/

/*

JSON structure:
[
    {
        "destination": {
            "prefix": [string],
            "paths": [
                {
                    "nlri": {
                        "@type": "type.googleapis.com/gobgpapi.LsAddrPrefix",
                        "type": [string, like "LS_NLRI_LINK"],
                        "nlri": {
                            "@type": "type.googleapis.com/gobgpapi.LsLinkNLRI",
                            "localNode": { "igpRouterId": [string], ... },
                            "remoteNode": { "igpRouterId": [string], ... },
                            ...
                        }
                    },
                    "pattrs": [
                        { "@type": "type.googleapis.com/gobgpapi.OriginAttribute", ... },
                        { "@type": "type.googleapis.com/gobgpapi.LsAttribute", "link": { "igpMetric": [int] } },
                        ...
                    ],
                    [opt] "best": [bool], // omitted when false
                    "age": ..., "family": ..., "neighborIp": ..., // everything else is carried through
                },
                ...
            ]
        }
    },
    ...
]

*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The whole fetch result, one entry per destination.
pub type RawTable = Vec<RawDestinationEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDestinationEntry {
    pub destination: RawDestination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDestination {
    #[serde(default)]
    pub paths: Vec<RawPath>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One candidate path for a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPath {
    #[serde(default)]
    pub best: bool,
    pub nlri: Value,
    #[serde(default)]
    pub pattrs: Vec<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

pub fn table_from_json(json: &str) -> Result<RawTable, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn table_from_yaml(yaml: &str) -> Result<RawTable, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
