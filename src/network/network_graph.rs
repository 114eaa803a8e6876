use std::collections::HashMap;

use petgraph::{
    Directed,
    stable_graph::{EdgeIndex, NodeIndex, StableGraph},
    visit::EdgeRef,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    network::{edge::Edge, node::Node, record::NormalizedRecord, router::RouterId},
    parsers::bgp_ls::{
        attribute::NlriKind,
        normalize::{MalformedReason, MalformedRecordError},
    },
};

/// Directed multigraph of routers and the links between them.
///
/// Nodes are keyed by IGP router ID; `node_id_to_index_map` maps those keys to
/// graph indices. Nodes are never removed, so iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    graph: StableGraph<Node, Edge, Directed>,
    node_id_to_index_map: HashMap<RouterId, NodeIndex>,
}

/// Counters collected while building a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub nodes: usize,
    pub placeholders: usize,
    pub links: usize,
    pub prefixes: usize,
    pub orphan_prefixes: usize,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from normalized records in two passes: node records first,
    /// then links and prefixes.
    pub fn build(records: &[NormalizedRecord]) -> Result<(Self, BuildStats), MalformedRecordError> {
        let mut topology = Self::new();
        let mut stats = BuildStats::default();

        for (index, record) in records.iter().enumerate() {
            if record.nlri_kind() == NlriKind::Node {
                let id = required_router_id(index, record, record.local_router_id())?;
                topology.insert_node(id, record.clone());
            }
        }

        for (index, record) in records.iter().enumerate() {
            match record.nlri_kind() {
                NlriKind::Link => {
                    let source = required_router_id(index, record, record.local_router_id())?;
                    let target = required_router_id(index, record, record.remote_router_id())?;
                    let metric = record.igp_metric.ok_or_else(|| MalformedRecordError {
                        index,
                        kind: NlriKind::Link,
                        reason: MalformedReason::MissingField("igpMetric"),
                    })?;
                    topology
                        .add_link(source, target, metric, record.clone())
                        .map_err(|err| MalformedRecordError {
                            index,
                            kind: NlriKind::Link,
                            reason: MalformedReason::Unserializable(err.to_string()),
                        })?;
                    stats.links += 1;
                }
                NlriKind::PrefixV4 => {
                    let id = required_router_id(index, record, record.local_router_id())?;
                    if topology.attach_prefix(&id, record.clone()) {
                        stats.prefixes += 1;
                    } else {
                        debug!(router_id = %id, "prefix record for unknown router skipped");
                        stats.orphan_prefixes += 1;
                    }
                }
                NlriKind::Node | NlriKind::Other(_) => {}
            }
        }

        stats.nodes = topology.node_count();
        stats.placeholders = topology.nodes().filter(|node| node.is_placeholder()).count();
        Ok((topology, stats))
    }

    /// Create the node, or replace the record of an existing one (placeholders included).
    pub fn insert_node(&mut self, id: RouterId, record: NormalizedRecord) -> NodeIndex {
        match self.node_id_to_index_map.get(&id) {
            Some(&index) => {
                self.graph[index].record = Some(record);
                index
            }
            None => {
                let index = self.graph.add_node(Node::from_record(id.clone(), record));
                self.node_id_to_index_map.insert(id, index);
                index
            }
        }
    }

    /// Index of the node, allocating a placeholder if the router is unknown.
    pub fn ensure_node(&mut self, id: &RouterId) -> NodeIndex {
        if let Some(&index) = self.node_id_to_index_map.get(id) {
            return index;
        }
        let index = self.graph.add_node(Node::placeholder(id.clone()));
        self.node_id_to_index_map.insert(id.clone(), index);
        index
    }

    /// Add a directed link. Endpoints are allocated on demand, so a link is
    /// never lost because its node record is missing or comes later.
    pub fn add_link(
        &mut self,
        source: RouterId,
        target: RouterId,
        metric: u32,
        record: NormalizedRecord,
    ) -> Result<EdgeIndex, serde_json::Error> {
        let edge = Edge::new(source, target, metric, record)?;
        let source_index = self.ensure_node(&edge.key.source);
        let target_index = self.ensure_node(&edge.key.target);
        Ok(self.graph.add_edge(source_index, target_index, edge))
    }

    /// Attach a prefix record to a router that has a node record.
    /// Returns `false` (and creates nothing) otherwise.
    pub fn attach_prefix(&mut self, id: &RouterId, record: NormalizedRecord) -> bool {
        match self.node_id_to_index_map.get(id) {
            Some(&index) if !self.graph[index].is_placeholder() => {
                self.graph[index].prefixes.push(record);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_id_to_index_map.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.graph[index])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Router IDs in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &RouterId> {
        self.nodes().map(|node| &node.id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|index| &self.graph[index])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_indices().map(|index| &self.graph[index])
    }

    /// All edges from `source` to `target`.
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<&Edge> {
        match (self.index_of(source), self.index_of(target)) {
            (Some(a), Some(b)) => self
                .graph
                .edges(a)
                .filter(|edge| edge.target() == b)
                .map(|edge| edge.weight())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_id_to_index_map.get(id).copied()
    }

    pub(crate) fn inner(&self) -> &StableGraph<Node, Edge, Directed> {
        &self.graph
    }
}

fn required_router_id(
    index: usize,
    record: &NormalizedRecord,
    id: Option<&str>,
) -> Result<RouterId, MalformedRecordError> {
    id.map(RouterId::from).ok_or_else(|| MalformedRecordError {
        index,
        kind: record.nlri_kind(),
        reason: MalformedReason::MissingField("igpRouterId"),
    })
}
