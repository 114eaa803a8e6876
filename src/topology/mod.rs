/*!
Topology module

This module turns a fetched BGP-LS table into a served topology.

Structure:
- `source`: The async trait (`AcquisitionSource`) that transports implement,
            plus the fetch-side error type.
- `pipeline`: One fetch -> normalize -> build cycle producing a `Snapshot`.
- `store`: `TopologyStore`, the atomically swapped current snapshot and source health.
- `refresh`: `RefreshDriver`, the periodic task that is the store's only writer.
- `query`: `QueryEngine`, the read-only operations served to clients.

Re-exports:
- The main type of each submodule for easy consumption by callers.
*/

pub mod pipeline;
pub mod query;
pub mod refresh;
pub mod source;
pub mod store;

pub use pipeline::{LsdbPipeline, RefreshError};
pub use query::{QueryEngine, QueryError};
pub use refresh::RefreshDriver;
pub use source::{AcquisitionError, AcquisitionSource};
pub use store::{Snapshot, TopologyStore};
