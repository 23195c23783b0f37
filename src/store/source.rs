//! Where boundary datasets come from. Fetching only happens at (re)load
//! time, never per query.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::info;
use url::Url;

use super::{BoundaryStore, LoadOptions};
use crate::error::StoreError;

/// A GeoJSON boundary dataset on disk or behind HTTP(S)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    File(PathBuf),
    Url(Url),
}

impl BoundarySource {
    /// `http://` and `https://` locations become URLs, anything else a path
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => BoundarySource::Url(url),
            _ => BoundarySource::File(PathBuf::from(location)),
        }
    }

    /// Read the raw dataset
    pub async fn fetch(&self) -> Result<String, StoreError> {
        match self {
            BoundarySource::File(path) => {
                info!("Reading boundaries from {}", path.display());
                Ok(tokio::fs::read_to_string(path).await?)
            }
            BoundarySource::Url(url) => {
                info!("Fetching boundaries from {}", url);
                let client = Client::builder()
                    .user_agent(concat!("precinct/", env!("CARGO_PKG_VERSION")))
                    .timeout(Duration::from_secs(120))
                    .build()?;
                let body = client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                Ok(body)
            }
        }
    }

    /// Fetch and validate into a store
    pub async fn load(&self, options: &LoadOptions) -> Result<BoundaryStore, StoreError> {
        let body = self.fetch().await?;
        BoundaryStore::from_geojson_str(&body, options)
    }
}

impl std::fmt::Display for BoundarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundarySource::File(path) => write!(f, "{}", path.display()),
            BoundarySource::Url(url) => write!(f, "{}", url),
        }
    }
}
