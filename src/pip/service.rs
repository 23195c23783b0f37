//! Jurisdiction lookup service.
//!
//! Queries clone the current snapshot under a short read lock and then run
//! without locks. Rebuilds are serialized and build the new index before
//! swapping it in, so a query never sees a partially built index.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{matches, normalize_match, rank, JurisdictionIndex, Match};
use crate::error::ResolveError;
use crate::models::{GeoPoint, ResolvedJurisdiction};
use crate::store::BoundaryStore;

/// An immutable index generation served to queries
pub struct Snapshot {
    pub index: JurisdictionIndex,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

/// Point-in-polygon jurisdiction lookup service
pub struct JurisdictionService {
    current: RwLock<Arc<Snapshot>>,
    rebuild: Mutex<()>,
}

impl JurisdictionService {
    /// Create a new service from a spatial index
    pub fn new(index: JurisdictionIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot {
                index,
                generation: 1,
                loaded_at: Utc::now(),
            })),
            rebuild: Mutex::new(()),
        }
    }

    pub fn from_store(store: BoundaryStore) -> Self {
        Self::new(JurisdictionIndex::build(store.into_boundaries()))
    }

    /// The snapshot queries are currently served from
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// All jurisdictions containing the point, in precedence order
    pub fn resolve(&self, point: GeoPoint) -> Result<Vec<ResolvedJurisdiction>, ResolveError> {
        Ok(self
            .resolve_matches(&point)?
            .iter()
            .map(normalize_match)
            .collect())
    }

    /// Ranked matches before normalization
    pub fn resolve_matches(&self, point: &GeoPoint) -> Result<Vec<Match>, ResolveError> {
        point.validate()?;

        let snapshot = self.snapshot();
        let candidates = snapshot.index.candidates(point);
        let found = matches(point, candidates);

        debug!(
            "Lookup at ({}, {}) on generation {}: {} matches",
            point.latitude,
            point.longitude,
            snapshot.generation,
            found.len()
        );

        Ok(rank(point, found))
    }

    /// Primary jurisdiction for a coordinate. `Ok(None)` means no
    /// jurisdiction covers the point; bad input is an error.
    pub fn get_jurisdiction_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ResolvedJurisdiction>, ResolveError> {
        Ok(self
            .resolve(GeoPoint::new(latitude, longitude))?
            .into_iter()
            .next())
    }

    /// Swap in a prebuilt index. Returns the new generation.
    pub fn replace(&self, index: JurisdictionIndex) -> u64 {
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(index)
    }

    /// Rebuild the index from a freshly loaded store and swap it in.
    /// In-flight queries finish on the snapshot they already hold.
    pub fn reload(&self, store: BoundaryStore) -> u64 {
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        let index = JurisdictionIndex::build(store.into_boundaries());
        self.swap(index)
    }

    fn swap(&self, index: JurisdictionIndex) -> u64 {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = current.generation + 1;
        let boundaries = index.len();
        *current = Arc::new(Snapshot {
            index,
            generation,
            loaded_at: Utc::now(),
        });
        info!(
            "Serving generation {} with {} boundaries",
            generation, boundaries
        );
        generation
    }
}
