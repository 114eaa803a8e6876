/*
 * This module defines the topology graph built from the normalized LSDB.
 * It also provides the node-link export and pathfinding on the graph.
 */

pub mod record;
pub mod router;
pub mod node;
pub mod edge;
pub mod network_graph;
pub mod export;
pub mod path;
