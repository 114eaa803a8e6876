use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    parsers::bgp_ls::raw::RawTable,
    topology::source::{AcquisitionError, AcquisitionResult, AcquisitionSource},
};

/// Fetches the table from an HTTP endpoint that returns the `ListPath` JSON.
///
/// GoBGP itself only exposes `ListPath` over gRPC. This source expects a
/// separate sidecar that calls it and serves the result, protobuf JSON mapping
/// included, as a single JSON array.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AcquisitionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AcquisitionError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AcquisitionSource for HttpSource {
    async fn fetch_raw(&mut self) -> AcquisitionResult<RawTable> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AcquisitionError::Transport(format!("GET {} failed: {}", self.url, e)))?;
        debug!(url = %self.url, status = %response.status(), "fetched BGP-LS table");

        response.json::<RawTable>().await.map_err(|e| {
            if e.is_decode() {
                AcquisitionError::Invalid(format!("Failed to parse table: {}", e))
            } else {
                AcquisitionError::Transport(format!("Failed to read response body: {}", e))
            }
        })
    }

    fn describe(&self) -> String {
        format!("http {}", self.url)
    }
}
