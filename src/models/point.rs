//! Query point supplied by the location collaborator.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Geographic point (lat/lon) with an optional GPS accuracy radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
        }
    }

    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy_meters = Some(meters);
        self
    }

    /// Reject points outside [-90, 90] x [-180, 180] and bad accuracy radii.
    pub fn validate(&self) -> Result<(), ResolveError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if !lat_ok || !lon_ok {
            return Err(ResolveError::InvalidPoint {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }

        if let Some(accuracy) = self.accuracy_meters {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(ResolveError::InvalidAccuracy(accuracy));
            }
        }

        Ok(())
    }

    /// Storage order coordinate: x = longitude, y = latitude
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}
