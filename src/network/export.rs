/*!
Node-link serialization of the topology graph.

The layout follows the usual node-link JSON convention:
`{"directed": true, "multigraph": true, "nodes": [{"id", "data"}], "links": [{"source", "target", "key", "data"}]}`.
Placeholder nodes carry no `data`.
*/

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::network::{
    edge::Edge, network_graph::TopologyGraph, node::Node, record::NormalizedRecord,
    router::RouterId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub directed: bool,
    pub multigraph: bool,
    pub nodes: Vec<ExportNode>,
    pub links: Vec<ExportLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNode {
    pub id: RouterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NormalizedRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<NormalizedRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLink {
    pub source: RouterId,
    pub target: RouterId,
    pub key: Uuid,
    pub data: NormalizedRecord,
}

impl From<&Node> for ExportNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            data: node.record.clone(),
            prefixes: node.prefixes.clone(),
        }
    }
}

impl From<&Edge> for ExportLink {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.key.source.clone(),
            target: edge.key.target.clone(),
            key: edge.key.record,
            data: edge.record.clone(),
        }
    }
}

impl GraphExport {
    pub fn node_ids(&self) -> impl Iterator<Item = &RouterId> {
        self.nodes.iter().map(|node| &node.id)
    }
}

impl TopologyGraph {
    pub fn export(&self) -> GraphExport {
        GraphExport {
            directed: true,
            multigraph: true,
            nodes: self.nodes().map(ExportNode::from).collect(),
            links: self.edges().map(ExportLink::from).collect(),
        }
    }

    /// Induced subgraph over `ids`: the listed nodes (in the given order, unknown
    /// ones skipped) and every edge whose both endpoints are among them.
    pub fn export_subgraph(&self, ids: &[RouterId]) -> GraphExport {
        let members: HashSet<&str> = ids.iter().map(RouterId::as_str).collect();
        let mut seen = HashSet::new();
        let nodes = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.node(id.as_str()))
            .map(ExportNode::from)
            .collect();
        let links = self
            .edges()
            .filter(|edge| {
                members.contains(edge.key.source.as_str()) && members.contains(edge.key.target.as_str())
            })
            .map(ExportLink::from)
            .collect();

        GraphExport {
            directed: true,
            multigraph: true,
            nodes,
            links,
        }
    }
}
