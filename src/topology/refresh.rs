use std::{sync::Arc, time::{Duration, SystemTime}};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{info, warn};

use crate::topology::{
    pipeline::{LsdbPipeline, RefreshError},
    store::{Snapshot, TopologyStore},
};

/// Periodically rebuilds the topology and publishes it into the store.
///
/// The driver is the only writer of the store. A failed cycle leaves the
/// previous snapshot in place and only updates the source health.
pub struct RefreshDriver {
    pipeline: LsdbPipeline,
    store: Arc<TopologyStore>,
    interval: Duration,
}

impl RefreshDriver {
    pub fn new(pipeline: LsdbPipeline, store: Arc<TopologyStore>, interval: Duration) -> Self {
        Self {
            pipeline,
            store,
            interval,
        }
    }

    /// Run one fetch -> normalize -> build cycle and publish the result.
    pub async fn refresh_once(&mut self) -> Result<Arc<Snapshot>, RefreshError> {
        match self.pipeline.build_snapshot().await {
            Ok(snapshot) => {
                let snapshot = self.store.publish(snapshot);
                info!(generation = snapshot.generation, "published topology snapshot");
                Ok(snapshot)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    source = %self.pipeline.describe_source(),
                    "refresh failed, keeping previous snapshot"
                );
                self.store.mark_lost(&err, SystemTime::now());
                Err(err)
            }
        }
    }

    /// Refresh every `interval` until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The first refresh happens one interval after the call; the startup build
    /// is expected to have been done by the caller.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(interval = ?self.interval, source = %self.pipeline.describe_source(), "refresh loop started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Errors are already logged and recorded in the store.
                    let _ = self.refresh_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("refresh loop stopped");
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parsers::bgp_ls::Normalizer,
        topology::{
            pipeline::tests::{ScriptedSource, fixture_table},
            source::AcquisitionError,
            store::SourceHealth,
        },
    };

    fn driver(source: ScriptedSource, store: Arc<TopologyStore>) -> RefreshDriver {
        let pipeline = LsdbPipeline::new(Box::new(source), Normalizer::default(), Duration::from_secs(1));
        RefreshDriver::new(pipeline, store, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_snapshot() {
        let store = Arc::new(TopologyStore::new());
        let mut driver = driver(
            ScriptedSource::new(vec![
                Ok(fixture_table()),
                Err(AcquisitionError::Transport("connection refused".to_string())),
            ]),
            Arc::clone(&store),
        );

        let first = driver.refresh_once().await.unwrap();
        assert!(driver.refresh_once().await.is_err());

        let current = store.current().unwrap();
        assert_eq!(current.generation, first.generation);
        assert_eq!(current.lsdb, first.lsdb);
        let state = store.source_state();
        assert_eq!(state.health, SourceHealth::Lost);
        assert_eq!(state.consecutive_failures, 1);
        assert!(state.last_error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_failed_first_cycle_leaves_store_uninitialized() {
        let store = Arc::new(TopologyStore::new());
        let mut driver = driver(ScriptedSource::new(vec![]), Arc::clone(&store));

        assert!(driver.refresh_once().await.is_err());
        assert!(!store.is_ready());
        assert_eq!(store.source_state().health, SourceHealth::Lost);
    }

    #[tokio::test]
    async fn test_lsdb_holds_one_record_per_best_path() {
        let store = Arc::new(TopologyStore::new());
        let mut driver = driver(ScriptedSource::new(vec![Ok(fixture_table())]), Arc::clone(&store));

        let snapshot = driver.refresh_once().await.unwrap();

        let best_paths = fixture_table()
            .iter()
            .flat_map(|entry| entry.destination.paths.iter())
            .filter(|path| path.best)
            .count();
        assert_eq!(best_paths, 8);
        assert_eq!(snapshot.lsdb.len(), best_paths);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_refreshes_on_interval_and_stops() {
        let store = Arc::new(TopologyStore::new());
        let driver = driver(
            ScriptedSource::new(vec![Ok(fixture_table()), Ok(fixture_table())]),
            Arc::clone(&store),
        );
        let (tx, rx) = watch::channel(false);
        let handle = driver.spawn(rx);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(store.current().unwrap().generation, 1);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.current().unwrap().generation, 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
