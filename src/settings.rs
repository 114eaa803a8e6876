use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::{
    data_aquisition::{FileSource, HttpSource},
    parsers::bgp_ls::PathSelection,
    topology::source::{AcquisitionError, AcquisitionResult, AcquisitionSource},
};

const ENV_PREFIX: &str = "BGPLS";

/// Command line. Every flag overrides the matching configuration key.
#[derive(Parser, Debug, Default)]
#[clap(author, version, about = "Serves a BGP-LS link-state database as a queryable topology graph", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Read the BGP-LS table from a JSON or YAML file
    #[clap(long, conflicts_with = "url")]
    pub fixture: Option<PathBuf>,

    /// Fetch the BGP-LS table from this URL
    #[clap(long)]
    pub url: Option<String>,

    /// Address of the HTTP API
    #[clap(short, long)]
    pub listen: Option<SocketAddr>,

    /// Time between refreshes, e.g. "30s" or "2m"
    #[clap(short, long, value_parser = humantime::parse_duration)]
    pub refresh_interval: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no LSDB source configured: set source.fixture or source.url")]
    NoSource,
    #[error("both source.fixture and source.url are set, pick one")]
    ConflictingSources,
    #[error("refresh.interval must be greater than zero")]
    ZeroInterval,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub fixture: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_fetch_timeout", deserialize_with = "deserialize_duration")]
    pub fetch_timeout: Duration,
    /// Wait before the first fetch, to let the BGP speaker come up.
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub startup_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefreshSettings {
    #[serde(default = "default_refresh_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(default)]
    pub path_selection: PathSelection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub api: ApiSettings,
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            fixture: None,
            url: None,
            fetch_timeout: default_fetch_timeout(),
            startup_delay: Duration::ZERO,
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: default_refresh_interval(),
            path_selection: PathSelection::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Durations are written the human way: "500ms", "30s", "2m".
fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

impl Settings {
    /// Defaults, then the optional file, then `BGPLS__SECTION__KEY` environment variables,
    /// then the command line.
    pub fn load(cli: &Cli) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(path.as_path()));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let mut settings: Self = config.try_deserialize()?;
        settings.apply_cli(cli);
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let settings: Self = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(fixture) = &cli.fixture {
            self.source.fixture = Some(fixture.clone());
            self.source.url = None;
        }
        if let Some(url) = &cli.url {
            self.source.url = Some(url.clone());
            self.source.fixture = None;
        }
        if let Some(listen) = cli.listen {
            self.api.listen = listen;
        }
        if let Some(interval) = cli.refresh_interval {
            self.refresh.interval = interval;
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.refresh.interval.is_zero() {
            return Err(SettingsError::ZeroInterval);
        }
        match (&self.source.fixture, &self.source.url) {
            (None, None) => Err(SettingsError::NoSource),
            (Some(_), Some(_)) => Err(SettingsError::ConflictingSources),
            _ => Ok(()),
        }
    }
}

impl SourceSettings {
    pub fn build_source(&self) -> AcquisitionResult<Box<dyn AcquisitionSource>> {
        match (&self.fixture, &self.url) {
            (Some(path), _) => Ok(Box::new(FileSource::new(path))),
            (None, Some(url)) => Ok(Box::new(HttpSource::new(url, self.fetch_timeout)?)),
            (None, None) => Err(AcquisitionError::Transport("no LSDB source configured".to_string())),
        }
    }
}
