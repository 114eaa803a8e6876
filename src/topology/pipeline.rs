use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    network::network_graph::TopologyGraph,
    parsers::bgp_ls::{MalformedRecordError, Normalizer},
    topology::{
        source::{AcquisitionError, AcquisitionSource},
        store::Snapshot,
    },
};

/// Why a refresh cycle produced no snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] AcquisitionError),
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
}

/// Fetch -> normalize -> build, for one acquisition source.
pub struct LsdbPipeline {
    source: Box<dyn AcquisitionSource>,
    normalizer: Normalizer,
    fetch_timeout: Duration,
}

impl LsdbPipeline {
    pub fn new(source: Box<dyn AcquisitionSource>, normalizer: Normalizer, fetch_timeout: Duration) -> Self {
        Self {
            source,
            normalizer,
            fetch_timeout,
        }
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    /// Produces a complete snapshot, or nothing at all.
    pub async fn build_snapshot(&mut self) -> Result<Snapshot, RefreshError> {
        let started = Instant::now();

        let table = tokio::time::timeout(self.fetch_timeout, self.source.fetch_raw())
            .await
            .map_err(|_| AcquisitionError::Timeout(self.fetch_timeout))??;
        let destinations = table.len();
        debug!(destinations, source = %self.source.describe(), "fetched BGP-LS table");

        let lsdb = self.normalizer.normalize(table)?;
        let (graph, stats) = TopologyGraph::build(&lsdb)?;

        info!(
            records = lsdb.len(),
            nodes = stats.nodes,
            placeholders = stats.placeholders,
            links = stats.links,
            prefixes = stats.prefixes,
            orphan_prefixes = stats.orphan_prefixes,
            elapsed = ?started.elapsed(),
            "built topology"
        );
        Ok(Snapshot::new(lsdb, graph, stats))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;
    use crate::parsers::bgp_ls::{
        normalize::MalformedReason,
        raw::{RawTable, table_from_json},
    };
    use crate::topology::source::AcquisitionResult;

    pub(crate) const FIXTURE: &str = include_str!("../../test_data/bgp_ls_table.json");

    /// Replays queued results, then keeps failing.
    pub(crate) struct ScriptedSource {
        pub(crate) results: VecDeque<AcquisitionResult<RawTable>>,
        pub(crate) delay: Option<Duration>,
    }

    impl ScriptedSource {
        pub(crate) fn new(results: Vec<AcquisitionResult<RawTable>>) -> Self {
            Self {
                results: results.into(),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl AcquisitionSource for ScriptedSource {
        async fn fetch_raw(&mut self) -> AcquisitionResult<RawTable> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.results
                .pop_front()
                .unwrap_or_else(|| Err(AcquisitionError::Transport("script exhausted".to_string())))
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    pub(crate) fn fixture_table() -> RawTable {
        table_from_json(FIXTURE).unwrap()
    }

    fn pipeline(source: ScriptedSource) -> LsdbPipeline {
        LsdbPipeline::new(Box::new(source), Normalizer::default(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_fixture_snapshot() {
        let mut pipeline = pipeline(ScriptedSource::new(vec![Ok(fixture_table())]));

        let snapshot = pipeline.build_snapshot().await.unwrap();

        assert_eq!(snapshot.lsdb.len(), 8);
        assert_eq!(snapshot.stats.nodes, 3);
        assert_eq!(snapshot.stats.links, 4);
        assert_eq!(snapshot.stats.prefixes, 1);
        let path = snapshot.graph.shortest_path("0000.0000.0001", "0000.0000.0003").unwrap();
        assert_eq!(path.cost, 15);
    }

    #[tokio::test]
    async fn test_fetch_error_surfaces() {
        let mut pipeline = pipeline(ScriptedSource::new(vec![Err(AcquisitionError::Transport(
            "connection refused".to_string(),
        ))]));

        let err = pipeline.build_snapshot().await.unwrap_err();
        assert!(matches!(err, RefreshError::Fetch(AcquisitionError::Transport(_))));
    }

    #[tokio::test]
    async fn test_malformed_record_fails_whole_cycle() {
        let mut table = fixture_table();
        // Strip the LsAttribute of the first link record.
        table[3].destination.paths[0].pattrs.retain(|pattr| {
            pattr["@type"] != "type.googleapis.com/gobgpapi.LsAttribute"
        });
        let mut pipeline = pipeline(ScriptedSource::new(vec![Ok(table)]));

        let err = pipeline.build_snapshot().await.unwrap_err();
        match err {
            RefreshError::Malformed(err) => assert_eq!(
                err.reason,
                MalformedReason::MissingField("pattrs.LsAttribute.link.igpMetric")
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_times_out() {
        let mut source = ScriptedSource::new(vec![Ok(fixture_table())]);
        source.delay = Some(Duration::from_secs(5));
        let mut pipeline = pipeline(source);

        let err = pipeline.build_snapshot().await.unwrap_err();
        assert_eq!(err, RefreshError::Fetch(AcquisitionError::Timeout(Duration::from_secs(1))));
    }
}
