use crate::generator::profile::GeneratorConfig;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use trackcore::prelude::{TrackConfig, DEFAULT_MAX_WINDOW, DEFAULT_MIN_DISTANCE_M};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub min_distance_m: f64,
    pub max_window: usize,
    pub demo: GeneratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9000".into(),
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            max_window: DEFAULT_MAX_WINDOW,
            demo: GeneratorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading server config {}", path_ref.display()))?;
        let config: ServerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing server config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line flags win over the file.
    pub fn with_overrides(mut self, bind: Option<String>, min_distance_m: Option<f64>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(min_distance_m) = min_distance_m {
            self.min_distance_m = min_distance_m;
        }
        self
    }

    /// Rejects trajectory settings every stage would refuse.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.min_distance_m.is_finite() && self.min_distance_m >= 0.0,
            "min_distance_m must be a finite, non-negative number of metres (got {})",
            self.min_distance_m
        );
        ensure!(
            self.max_window >= 1,
            "max_window must be at least 1 (got {})",
            self.max_window
        );
        Ok(())
    }

    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("invalid bind address {}", self.bind))
    }

    pub fn to_track_config(&self) -> TrackConfig {
        TrackConfig {
            min_distance_m: self.min_distance_m,
            max_window: self.max_window,
        }
    }
}
