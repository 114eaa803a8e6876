/*!
Record normalization for the BGP-LS table.

Raw paths arrive keyed by protobuf `Any` type URLs, with their path attributes
as a list of `{ "@type": ..., ...fields }` objects. Normalization:
- keeps only best paths (unless `PathSelection::AllPaths`),
- renames the `@type` discriminator to `type` and every known type URL (as a key
  or as a string value) to its semantic name,
- flattens the attribute list into a map keyed by attribute name,
- lifts `igpMetric` (links) and `name` (nodes) to the top of the record.
*/

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{
    network::record::NormalizedRecord,
    parsers::bgp_ls::{
        attribute::{AttributeKind, NlriKind, TYPE_KEY, WIRE_TYPE_KEY},
        raw::{RawPath, RawTable},
    },
};

/// Which candidate paths of a destination survive normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathSelection {
    #[default]
    BestOnly,
    AllPaths,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed record #{index} ({kind}): {reason}")]
pub struct MalformedRecordError {
    /// Position of the record among the selected paths.
    pub index: usize,
    pub kind: NlriKind,
    pub reason: MalformedReason,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedReason {
    #[error("path attribute {0} is not an object")]
    AttributeNotObject(usize),
    #[error("path attribute {0} has no string `type`")]
    AttributeWithoutType(usize),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("igpMetric {0} is not a non-negative 32-bit integer")]
    InvalidMetric(Value),
    #[error("record cannot be serialized: {0}")]
    Unserializable(String),
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    selection: PathSelection,
}

impl Normalizer {
    pub fn new(selection: PathSelection) -> Self {
        Self { selection }
    }

    /// Normalizes a whole fetch result. A single malformed record fails the whole table.
    pub fn normalize(&self, table: RawTable) -> Result<Vec<NormalizedRecord>, MalformedRecordError> {
        let candidates: usize = table.iter().map(|entry| entry.destination.paths.len()).sum();
        let records = table
            .into_iter()
            .flat_map(|entry| entry.destination.paths)
            .filter(|path| self.selection == PathSelection::AllPaths || path.best)
            .enumerate()
            .map(|(index, path)| normalize_path(index, path))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            candidates,
            selected = records.len(),
            selection = ?self.selection,
            "normalized BGP-LS table"
        );
        Ok(records)
    }
}

fn normalize_path(index: usize, path: RawPath) -> Result<NormalizedRecord, MalformedRecordError> {
    let RawPath { best, nlri, pattrs, fields } = path;

    let mut record = NormalizedRecord {
        nlri: rekey(nlri),
        pattrs: Map::new(),
        igp_metric: None,
        name: None,
        fields: fields.into_iter().map(|(key, value)| (rekey_key(key), rekey(value))).collect(),
    };
    record.fields.insert("best".to_string(), Value::Bool(best));

    let kind = record.nlri_kind();
    let malformed = |reason: MalformedReason| MalformedRecordError {
        index,
        kind: kind.clone(),
        reason,
    };

    record.pattrs = flatten_pattrs(pattrs.into_iter().map(rekey)).map_err(&malformed)?;
    derive_fields(&mut record).map_err(&malformed)?;
    Ok(record)
}

/// Renames the discriminator key and every known type URL, recursively.
/// Applying it to already-normalized data is a no-op.
pub fn rekey(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let has_plain_type = map.contains_key(TYPE_KEY);
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                // The plain field wins over the renamed discriminator.
                if key == WIRE_TYPE_KEY && has_plain_type {
                    continue;
                }
                out.insert(rekey_key(key), rekey(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(rekey).collect()),
        Value::String(s) => match AttributeKind::from_type_url(&s) {
            Some(kind) => Value::String(kind.name().to_string()),
            None => Value::String(s),
        },
        other => other,
    }
}

fn rekey_key(key: String) -> String {
    if key == WIRE_TYPE_KEY {
        return TYPE_KEY.to_string();
    }
    match AttributeKind::from_type_url(&key) {
        Some(kind) => kind.name().to_string(),
        None => key,
    }
}

/// Turns `[{type: A, ..}, {type: B, ..}]` into `{A: {..}, B: {..}}`. Repeated kinds: last wins.
fn flatten_pattrs(
    pattrs: impl Iterator<Item = Value>,
) -> Result<Map<String, Value>, MalformedReason> {
    let mut flat = Map::new();
    for (position, pattr) in pattrs.enumerate() {
        let Value::Object(mut fields) = pattr else {
            return Err(MalformedReason::AttributeNotObject(position));
        };
        let kind = match fields.remove(TYPE_KEY) {
            Some(Value::String(kind)) => kind,
            _ => return Err(MalformedReason::AttributeWithoutType(position)),
        };
        flat.insert(kind, Value::Object(fields));
    }
    Ok(flat)
}

fn derive_fields(record: &mut NormalizedRecord) -> Result<(), MalformedReason> {
    match record.nlri_kind() {
        NlriKind::Link => {
            if record.local_router_id().is_none() {
                return Err(MalformedReason::MissingField("nlri.nlri.localNode.igpRouterId"));
            }
            if record.remote_router_id().is_none() {
                return Err(MalformedReason::MissingField("nlri.nlri.remoteNode.igpRouterId"));
            }
            let metric = record
                .attribute(AttributeKind::LinkState)
                .and_then(|ls| ls.get("link"))
                .and_then(|link| link.get("igpMetric"))
                .ok_or(MalformedReason::MissingField("pattrs.LsAttribute.link.igpMetric"))?;
            let metric = parse_metric(metric).ok_or_else(|| MalformedReason::InvalidMetric(metric.clone()))?;
            record.igp_metric = Some(metric);
        }
        NlriKind::Node => {
            let router_id = record
                .local_router_id()
                .ok_or(MalformedReason::MissingField("nlri.nlri.localNode.igpRouterId"))?
                .to_string();
            let advertised = record
                .attribute(AttributeKind::LinkState)
                .and_then(|ls| ls.get("node"))
                .and_then(|node| node.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string);
            record.name = Some(advertised.unwrap_or(router_id));
        }
        NlriKind::PrefixV4 => {
            if record.local_router_id().is_none() {
                return Err(MalformedReason::MissingField("nlri.nlri.localNode.igpRouterId"));
            }
        }
        NlriKind::Other(_) => {}
    }
    Ok(())
}

// 64-bit integers are rendered as strings by the protobuf JSON mapping.
fn parse_metric(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
