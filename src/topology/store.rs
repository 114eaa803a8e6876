/*!
This module holds the published topology and the health of the source it came from.

This module defines:
- `Snapshot`: an immutable `(LSDB, graph)` pair built by one refresh cycle.
- `SourceHealth`: Represents the source's status
- `SourceState`: bookkeeping about refresh successes and failures.
- `TopologyStore`: the single-writer, wait-free-read holder of the current snapshot.
*/

use std::{
    fmt::Display,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::SystemTime,
};

use arc_swap::{ArcSwap, ArcSwapOption};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::network::{
    network_graph::{BuildStats, TopologyGraph},
    record::NormalizedRecord,
};

/// One consistent view of the LSDB and the graph built from it. Never mutated after publication.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Assigned by the store on publication, starting at 1.
    pub generation: u64,
    pub created_at: SystemTime,
    pub lsdb: Vec<NormalizedRecord>,
    pub graph: TopologyGraph,
    pub stats: BuildStats,
}

impl Snapshot {
    pub fn new(lsdb: Vec<NormalizedRecord>, graph: TopologyGraph, stats: BuildStats) -> Self {
        Self {
            generation: 0,
            created_at: SystemTime::now(),
            lsdb,
            graph,
            stats,
        }
    }
}

/// Represents the source's status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SourceHealth {
    /// Nothing has been attempted yet.
    Unknown,
    Connected,
    Lost,
}

impl Display for SourceHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceHealth::Unknown => write!(f, "Unknown"),
            SourceHealth::Connected => write!(f, "Connected"),
            SourceHealth::Lost => write!(f, "Lost"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceState {
    pub health: SourceHealth,
    #[serde(serialize_with = "serialize_time")]
    pub last_snapshot: Option<SystemTime>, // when we last replaced the snapshot successfully
    #[serde(serialize_with = "serialize_time")]
    pub last_failure: Option<SystemTime>,
    #[serde(serialize_with = "serialize_time")]
    pub last_status_change: Option<SystemTime>, // when health last changed
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            health: SourceHealth::Unknown,
            last_snapshot: None,
            last_failure: None,
            last_status_change: None,
            last_error: None,
            consecutive_failures: 0,
        }
    }
}

impl SourceState {
    fn connected(&self, timestamp: SystemTime) -> Self {
        Self {
            health: SourceHealth::Connected,
            last_snapshot: Some(timestamp),
            last_failure: self.last_failure,
            last_status_change: self.status_change_to(SourceHealth::Connected, timestamp),
            last_error: None,
            consecutive_failures: 0,
        }
    }

    fn lost(&self, error: String, timestamp: SystemTime) -> Self {
        Self {
            health: SourceHealth::Lost,
            last_snapshot: self.last_snapshot,
            last_failure: Some(timestamp),
            last_status_change: self.status_change_to(SourceHealth::Lost, timestamp),
            last_error: Some(error),
            consecutive_failures: self.consecutive_failures.saturating_add(1),
        }
    }

    fn status_change_to(&self, health: SourceHealth, timestamp: SystemTime) -> Option<SystemTime> {
        if self.health == health {
            self.last_status_change
        } else {
            Some(timestamp)
        }
    }
}

pub(crate) fn serialize_time<S: Serializer>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => serializer.serialize_str(&humantime::format_rfc3339_seconds(*time).to_string()),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("topology not ready: no snapshot has been published yet")]
    NotReady,
}

/// Storage for the current snapshot.
///
/// Publication is a single pointer swap. Readers load the pointer without
/// locking, so they neither wait for a refresh in progress nor observe a
/// partially built graph.
#[derive(Debug)]
pub struct TopologyStore {
    current: ArcSwapOption<Snapshot>,
    generation: AtomicU64,
    source_state: ArcSwap<SourceState>,
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
            source_state: ArcSwap::from_pointee(SourceState::default()),
        }
    }

    /// Replace the current snapshot. Only the refresh side calls this.
    pub fn publish(&self, mut snapshot: Snapshot) -> Arc<Snapshot> {
        snapshot.generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let snapshot = Arc::new(snapshot);
        self.current.store(Some(Arc::clone(&snapshot)));

        let timestamp = snapshot.created_at;
        self.source_state.rcu(|state| state.connected(timestamp));
        snapshot
    }

    /// The last published snapshot.
    pub fn current(&self) -> Result<Arc<Snapshot>, StoreError> {
        self.current.load_full().ok_or(StoreError::NotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// Record a failed refresh. The current snapshot stays in place.
    pub fn mark_lost(&self, error: impl Display, timestamp: SystemTime) {
        let error = error.to_string();
        self.source_state.rcu(|state| state.lost(error.clone(), timestamp));
    }

    pub fn source_state(&self) -> Arc<SourceState> {
        self.source_state.load_full()
    }
}
