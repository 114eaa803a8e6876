use crate::network::{record::NormalizedRecord, router::RouterId};

/// A router in the topology graph.
///
/// A node without a `record` is a placeholder: it was created because a link
/// referenced the router, but no node NLRI for it has been seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: RouterId,
    pub record: Option<NormalizedRecord>,
    pub prefixes: Vec<NormalizedRecord>,
}

impl Node {
    pub fn placeholder(id: RouterId) -> Self {
        Self {
            id,
            record: None,
            prefixes: Vec::new(),
        }
    }

    pub fn from_record(id: RouterId, record: NormalizedRecord) -> Self {
        Self {
            id,
            record: Some(record),
            prefixes: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.record.is_none()
    }
}
