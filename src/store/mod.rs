//! Boundary Store: loads, validates and owns a set of jurisdiction boundaries.
//!
//! Malformed records never reach the index. They are collected with the
//! broken invariant so the operator can fix the dataset.

mod features;
mod source;

use hashbrown::HashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MalformedPolygon, MalformedReason, StoreError};
use crate::pip::{BoundaryPolygon, RawBoundary};

pub use features::parse_features;
pub use source::BoundarySource;

/// Axis order of positions in the source dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    /// `[longitude, latitude]`, as GeoJSON mandates
    #[default]
    LonLat,
    /// `[latitude, longitude]`
    LatLon,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub coordinate_order: CoordinateOrder,
    /// Reject rings whose last vertex does not repeat the first
    pub strict_closure: bool,
}

/// Validated boundaries plus the records that were excluded
#[derive(Debug, Clone, Default)]
pub struct BoundaryStore {
    boundaries: Vec<BoundaryPolygon>,
    rejected: Vec<MalformedPolygon>,
}

impl BoundaryStore {
    /// Parse and validate a GeoJSON FeatureCollection
    pub fn from_geojson_str(input: &str, options: &LoadOptions) -> Result<Self, StoreError> {
        let (records, rejected) = parse_features(input)?
            .into_iter()
            .fold((Vec::new(), Vec::new()), |(mut ok, mut bad), record| {
                match record {
                    Ok(raw) => ok.push(raw),
                    Err(err) => bad.push(err),
                }
                (ok, bad)
            });

        Ok(Self::validate(records, rejected, options))
    }

    /// Validate raw records in parallel. The first record with a given id
    /// wins; later duplicates are rejected.
    pub fn from_records(records: Vec<RawBoundary>, options: &LoadOptions) -> Self {
        Self::validate(records, Vec::new(), options)
    }

    fn validate(
        records: Vec<RawBoundary>,
        mut rejected: Vec<MalformedPolygon>,
        options: &LoadOptions,
    ) -> Self {
        let validated: Vec<Result<BoundaryPolygon, MalformedPolygon>> = records
            .into_par_iter()
            .map(|raw| BoundaryPolygon::from_raw(raw, options))
            .collect();

        let mut seen = HashSet::new();
        let mut boundaries = Vec::with_capacity(validated.len());

        for result in validated {
            match result {
                Ok(boundary) if seen.insert(boundary.id.clone()) => boundaries.push(boundary),
                Ok(boundary) => rejected.push(MalformedPolygon::new(
                    boundary.id,
                    MalformedReason::DuplicateId,
                )),
                Err(err) => rejected.push(err),
            }
        }

        let store = Self {
            boundaries,
            rejected,
        };
        store.log_summary();
        store
    }

    fn log_summary(&self) {
        for rejection in &self.rejected {
            warn!("Excluding boundary: {}", rejection);
        }
        info!(
            "Loaded {} boundaries ({} rejected)",
            self.boundaries.len(),
            self.rejected.len()
        );
    }

    pub fn boundaries(&self) -> &[BoundaryPolygon] {
        &self.boundaries
    }

    pub fn rejected(&self) -> &[MalformedPolygon] {
        &self.rejected
    }

    pub fn into_boundaries(self) -> Vec<BoundaryPolygon> {
        self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Operator-facing description of the excluded records
    pub fn rejection_report(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        let mut report = format!(
            "**{}** of **{}** boundary records were excluded:",
            self.rejected.len(),
            self.rejected.len() + self.boundaries.len()
        );
        for rejection in self.rejected.iter().take(20) {
            report.push_str(&format!("\n- `{}`: {}", rejection.id, rejection.reason));
        }
        if self.rejected.len() > 20 {
            report.push_str(&format!("\n- ... and {} more", self.rejected.len() - 20));
        }
        Some(report)
    }
}
