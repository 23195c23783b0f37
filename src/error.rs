//! Error types for boundary loading and jurisdiction resolution.

use thiserror::Error;

/// Query-time failures. "No jurisdiction here" is not an error; see
/// [`crate::pip::JurisdictionService::get_jurisdiction_by_coordinates`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("invalid point: latitude {latitude}, longitude {longitude} is out of range")]
    InvalidPoint { latitude: f64, longitude: f64 },

    #[error("invalid accuracy radius: {0} meters")]
    InvalidAccuracy(f64),
}

/// Why a stored boundary was excluded from the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("record has no id")]
    MissingId,

    #[error("id already used by an earlier record")]
    DuplicateId,

    #[error("unsupported geometry type {0}")]
    UnsupportedGeometry(String),

    #[error("record has neither geometry nor bbox")]
    MissingGeometry,

    #[error("polygon has no rings")]
    EmptyPolygon,

    #[error("ring {ring} has fewer than 3 distinct vertices")]
    TooFewVertices { ring: usize },

    #[error("ring {ring} is not closed")]
    UnclosedRing { ring: usize },

    #[error("coordinate is not a finite number")]
    NonFiniteCoordinate,

    #[error("coordinate outside latitude/longitude range")]
    OutOfRange,

    #[error("hole ring {ring} is not enclosed by its outer ring")]
    HoleOutsideOuter { ring: usize },

    #[error("ring encircles a pole and cannot be unwrapped across the antimeridian")]
    EncirclesPole,

    #[error("bbox is not [min_x, min_y, max_x, max_y]")]
    InvalidExtent,
}

/// A boundary record rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed polygon {id}: {reason}")]
pub struct MalformedPolygon {
    pub id: String,
    pub reason: MalformedReason,
}

impl MalformedPolygon {
    pub fn new(id: impl Into<String>, reason: MalformedReason) -> Self {
        Self {
            id: id.into(),
            reason,
        }
    }
}

/// Dataset-level load failures. These abort a (re)load as a whole.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to parse GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("expected a GeoJSON FeatureCollection or Feature")]
    NotFeatureCollection,

    #[error("failed to read boundary dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch boundary dataset: {0}")]
    Http(#[from] reqwest::Error),
}
