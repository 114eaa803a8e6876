/*!
Read-side operations over the current snapshot.

Every call loads the snapshot once, so a single answer never mixes two
generations even if a refresh publishes in the meantime.
*/

use std::{sync::Arc, time::SystemTime};

use serde::Serialize;
use thiserror::Error;

use crate::{
    network::{
        export::GraphExport, network_graph::BuildStats, path::PathError, record::NormalizedRecord,
        router::RouterId,
    },
    topology::store::{SourceState, StoreError, TopologyStore, serialize_time},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("topology not ready: no snapshot has been published yet")]
    NotReady,
    #[error("unknown node: {0}")]
    UnknownNode(RouterId),
    #[error("no path from {from} to {to}")]
    NoPath { from: RouterId, to: RouterId },
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotReady => QueryError::NotReady,
        }
    }
}

impl From<PathError> for QueryError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::UnknownNode(id) => QueryError::UnknownNode(id),
            PathError::NoPath { from, to } => QueryError::NoPath { from, to },
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Health and size of the served topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyStatus {
    pub ready: bool,
    pub generation: Option<u64>,
    #[serde(serialize_with = "serialize_time")]
    pub snapshot_created_at: Option<SystemTime>,
    pub records: usize,
    pub stats: Option<BuildStats>,
    pub source: SourceState,
}

#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<TopologyStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<TopologyStore>) -> Self {
        Self { store }
    }

    /// Router IDs in graph insertion order.
    pub fn list_nodes(&self) -> QueryResult<Vec<RouterId>> {
        let snapshot = self.store.current()?;
        Ok(snapshot.graph.node_ids().cloned().collect())
    }

    /// The normalized records of the snapshot, in fetch order.
    pub fn dump_lsdb(&self) -> QueryResult<Vec<NormalizedRecord>> {
        Ok(self.store.current()?.lsdb.clone())
    }

    pub fn export_graph(&self) -> QueryResult<GraphExport> {
        Ok(self.store.current()?.graph.export())
    }

    pub fn shortest_path(&self, source: &str, target: &str) -> QueryResult<Vec<RouterId>> {
        let snapshot = self.store.current()?;
        Ok(snapshot.graph.shortest_path(source, target)?.hops)
    }

    /// Nodes of the shortest path plus every edge between any two of them.
    pub fn shortest_path_subgraph(&self, source: &str, target: &str) -> QueryResult<GraphExport> {
        let snapshot = self.store.current()?;
        Ok(snapshot.graph.shortest_path_subgraph(source, target)?)
    }

    /// Never fails; an uninitialized store reports `ready: false`.
    pub fn status(&self) -> TopologyStatus {
        let source = self.store.source_state().as_ref().clone();
        match self.store.current() {
            Ok(snapshot) => TopologyStatus {
                ready: true,
                generation: Some(snapshot.generation),
                snapshot_created_at: Some(snapshot.created_at),
                records: snapshot.lsdb.len(),
                stats: Some(snapshot.stats),
                source,
            },
            Err(StoreError::NotReady) => TopologyStatus {
                ready: false,
                generation: None,
                snapshot_created_at: None,
                records: 0,
                stats: None,
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        network::network_graph::{
            TopologyGraph,
            tests::{link_record, node_record},
        },
        parsers::bgp_ls::Normalizer,
        topology::{
            pipeline::tests::fixture_table,
            store::{Snapshot, SourceHealth},
        },
    };

    fn engine(records: Vec<NormalizedRecord>) -> QueryEngine {
        let store = Arc::new(TopologyStore::new());
        let (graph, stats) = TopologyGraph::build(&records).unwrap();
        store.publish(Snapshot::new(records, graph, stats));
        QueryEngine::new(store)
    }

    fn ids(hops: &[RouterId]) -> Vec<&str> {
        hops.iter().map(RouterId::as_str).collect()
    }

    fn triangle() -> QueryEngine {
        engine(vec![
            node_record("P1"),
            node_record("P2"),
            node_record("P3"),
            link_record("P1", "P2", 10),
            link_record("P2", "P3", 5),
            link_record("P1", "P2", 1),
            link_record("P3", "P1", 4),
        ])
    }

    #[test]
    fn test_not_ready_before_first_publish() {
        let engine = QueryEngine::new(Arc::new(TopologyStore::new()));

        assert_eq!(engine.list_nodes(), Err(QueryError::NotReady));
        assert_eq!(engine.dump_lsdb(), Err(QueryError::NotReady));
        assert_eq!(engine.shortest_path("P1", "P2"), Err(QueryError::NotReady));
        let status = engine.status();
        assert!(!status.ready);
        assert_eq!(status.source.health, SourceHealth::Unknown);
    }

    #[test]
    fn test_list_nodes_in_insertion_order() {
        let engine = triangle();

        assert_eq!(ids(&engine.list_nodes().unwrap()), vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_shortest_path_queries() {
        let engine = triangle();

        assert_eq!(ids(&engine.shortest_path("P1", "P3").unwrap()), vec!["P1", "P2", "P3"]);
        assert_eq!(ids(&engine.shortest_path("P2", "P2").unwrap()), vec!["P2"]);
        assert_eq!(
            engine.shortest_path("P1", "P9"),
            Err(QueryError::UnknownNode("P9".into()))
        );
    }

    #[test]
    fn test_no_path() {
        let engine = engine(vec![node_record("P1"), node_record("P2")]);

        assert_eq!(
            engine.shortest_path("P1", "P2"),
            Err(QueryError::NoPath {
                from: "P1".into(),
                to: "P2".into()
            })
        );
    }

    #[test]
    fn test_subgraph_nodes_match_path() {
        let engine = triangle();

        let path = engine.shortest_path("P1", "P3").unwrap();
        let sub = engine.shortest_path_subgraph("P1", "P3").unwrap();

        let nodes: Vec<RouterId> = sub.node_ids().cloned().collect();
        assert_eq!(nodes, path);
        // Both parallel P1->P2 links and the unused P3->P1 link are included.
        assert_eq!(sub.links.len(), 4);
        let members: HashSet<&RouterId> = path.iter().collect();
        assert!(
            sub.links
                .iter()
                .all(|link| members.contains(&link.source) && members.contains(&link.target))
        );
    }

    #[test]
    fn test_fixture_queries() {
        let records = Normalizer::default().normalize(fixture_table()).unwrap();
        let engine = engine(records);

        assert_eq!(engine.dump_lsdb().unwrap().len(), 8);
        assert_eq!(
            ids(&engine.shortest_path("0000.0000.0003", "0000.0000.0001").unwrap()),
            vec!["0000.0000.0003", "0000.0000.0002", "0000.0000.0001"]
        );
        let export = engine.export_graph().unwrap();
        assert_eq!(export.nodes.len(), 3);
        assert_eq!(export.links.len(), 4);

        let status = engine.status();
        assert!(status.ready);
        assert_eq!(status.generation, Some(1));
        assert_eq!(status.records, 8);
        assert_eq!(status.stats.unwrap().links, 4);
        assert_eq!(status.source.health, SourceHealth::Connected);
    }
}
