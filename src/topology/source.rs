/*!
Fetch-side interface.

This module defines:
- `AcquisitionError`: transport and payload errors of a fetch.
- `AcquisitionSource`: an async trait returning the raw BGP-LS table.

Adapters (static fixture, HTTP, ...) implement `AcquisitionSource` and hide how
they obtain the table. All of them produce the same raw shape.
*/

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::parsers::bgp_ls::raw::RawTable;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcquisitionError {
    /// The source could not be reached or read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The source answered with something that is not a BGP-LS table.
    #[error("invalid LSDB payload: {0}")]
    Invalid(String),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Represents a source of the raw BGP-LS table, e.g. a BGP speaker's RPC API or a fixture file.
#[async_trait]
pub trait AcquisitionSource: Send + Sync {
    /// Fetches the whole table.
    async fn fetch_raw(&mut self) -> AcquisitionResult<RawTable>;
    /// Human readable description of where the data comes from, for logs.
    fn describe(&self) -> String;
}
