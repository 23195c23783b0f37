use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::render::RendererKind;
use crate::store::{BoundarySource, CoordinateOrder, LoadOptions};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Dataset path or http(s) URL
    pub source: String,
    #[serde(default)]
    pub coordinate_order: CoordinateOrder,
    #[serde(default)]
    pub strict_closure: bool,
    pub refresh_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub renderer: RendererKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            renderer: RendererKind::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl StoreConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            coordinate_order: self.coordinate_order,
            strict_closure: self.strict_closure,
        }
    }

    pub fn source(&self) -> BoundarySource {
        BoundarySource::parse(&self.source)
    }

    /// Zero disables refreshing
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
