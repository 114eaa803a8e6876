use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    parsers::bgp_ls::raw::{RawTable, table_from_json, table_from_yaml},
    topology::source::{AcquisitionError, AcquisitionResult, AcquisitionSource},
};

/// Serves a BGP-LS table dumped to disk. The file is re-read on every fetch,
/// so editing it changes the topology on the next refresh.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_yaml(&self) -> bool {
        matches!(
            self.path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        )
    }
}

#[async_trait]
impl AcquisitionSource for FileSource {
    async fn fetch_raw(&mut self) -> AcquisitionResult<RawTable> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AcquisitionError::Transport(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), bytes = contents.len(), "read fixture");

        if self.is_yaml() {
            table_from_yaml(&contents)
                .map_err(|e| AcquisitionError::Invalid(format!("Failed to parse YAML table: {}", e)))
        } else {
            table_from_json(&contents)
                .map_err(|e| AcquisitionError::Invalid(format!("Failed to parse JSON table: {}", e)))
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data/bgp_ls_table.json")
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bgp-ls-topology-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_reads_json_fixture() {
        let mut source = FileSource::new(fixture_path());

        let table = source.fetch_raw().await.unwrap();

        assert_eq!(table.len(), 8);
        assert!(source.describe().ends_with("bgp_ls_table.json"));
    }

    #[tokio::test]
    async fn test_reads_yaml_by_extension() {
        let path = temp_path("table.yaml");
        tokio::fs::write(
            &path,
            "- destination:\n    paths:\n      - best: true\n        nlri: {}\n",
        )
        .await
        .unwrap();

        let table = FileSource::new(&path).fetch_raw().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(table.len(), 1);
        assert!(table[0].destination.paths[0].best);
    }

    #[tokio::test]
    async fn test_missing_file_is_transport_error() {
        let mut source = FileSource::new(temp_path("does-not-exist.json"));

        let err = source.fetch_raw().await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Transport(_)));
    }

    #[tokio::test]
    async fn test_garbage_is_invalid() {
        let path = temp_path("garbage.json");
        tokio::fs::write(&path, "{\"not\": \"a table\"}").await.unwrap();

        let err = FileSource::new(&path).fetch_raw().await.unwrap_err();
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(matches!(err, AcquisitionError::Invalid(_)));
    }
}
