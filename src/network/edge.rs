use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::network::{record::NormalizedRecord, router::RouterId};

/// Identity of a directed link. Parallel links between the same routers
/// differ by the identity of the record that advertised them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: RouterId,
    pub target: RouterId,
    pub record: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub key: EdgeKey,
    pub metric: u32,
    pub record: NormalizedRecord,
}

impl Edge {
    pub fn new(
        source: RouterId,
        target: RouterId,
        metric: u32,
        record: NormalizedRecord,
    ) -> Result<Self, serde_json::Error> {
        let key = EdgeKey {
            source,
            target,
            record: record.identity()?,
        };
        Ok(Self { key, metric, record })
    }

    /// Cost of the edge for shortest path computations.
    pub fn cost(&self) -> u64 {
        u64::from(self.metric)
    }
}
