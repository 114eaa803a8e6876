use petgraph::algo::astar;
use thiserror::Error;

use crate::network::{export::GraphExport, network_graph::TopologyGraph, router::RouterId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("unknown node: {0}")]
    UnknownNode(RouterId),
    #[error("no path from {from} to {to}")]
    NoPath { from: RouterId, to: RouterId },
}

/// Result of a shortest path computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub hops: Vec<RouterId>,
    pub cost: u64,
}

impl TopologyGraph {
    /// Dijkstra over `igpMetric`. Parallel edges are relaxed independently, so
    /// the cheapest one between two routers determines the cost.
    pub fn shortest_path(&self, source: &str, target: &str) -> Result<ShortestPath, PathError> {
        let start = self
            .index_of(source)
            .ok_or_else(|| PathError::UnknownNode(source.into()))?;
        let goal = self
            .index_of(target)
            .ok_or_else(|| PathError::UnknownNode(target.into()))?;

        // A zero heuristic turns A* into Dijkstra while keeping the predecessor chain.
        let (cost, indices) = astar(
            self.inner(),
            start,
            |index| index == goal,
            |edge| edge.weight().cost(),
            |_| 0u64,
        )
        .ok_or_else(|| PathError::NoPath {
            from: source.into(),
            to: target.into(),
        })?;

        let graph = self.inner();
        let hops = indices.into_iter().map(|index| graph[index].id.clone()).collect();
        Ok(ShortestPath { hops, cost })
    }

    /// Induced subgraph over the nodes of the shortest path. Every edge between
    /// two path nodes is included, not only the ones the path uses.
    pub fn shortest_path_subgraph(&self, source: &str, target: &str) -> Result<GraphExport, PathError> {
        let path = self.shortest_path(source, target)?;
        Ok(self.export_subgraph(&path.hops))
    }
}
