//! Spatial index for fast jurisdiction candidate lookups.

use hashbrown::{HashMap, HashSet};
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{info, warn};

use super::BoundaryPolygon;
use crate::models::{GeoPoint, JurisdictionType};

/// Wrapper for R-tree indexing of one boundary part
#[derive(Clone)]
pub struct IndexedBoundary {
    pub boundary: Arc<BoundaryPolygon>,
    pub part: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedBoundary {
    /// One entry per part (and per antimeridian mirror) of the boundary
    pub fn for_boundary(boundary: Arc<BoundaryPolygon>) -> Vec<Self> {
        boundary
            .envelopes()
            .into_iter()
            .map(|(part, rect)| Self {
                boundary: Arc::clone(&boundary),
                part,
                envelope: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            })
            .collect()
    }
}

/// Spatial index for jurisdiction boundaries using R-tree
pub struct JurisdictionIndex {
    tree: RTree<IndexedBoundary>,
    by_id: HashMap<String, Arc<BoundaryPolygon>>,
    /// Boundaries grouped by type, in precedence order
    by_type: Vec<(JurisdictionType, Vec<Arc<BoundaryPolygon>>)>,
}

impl JurisdictionIndex {
    /// Build spatial index from validated boundaries
    pub fn build(boundaries: Vec<BoundaryPolygon>) -> Self {
        info!(
            "Building spatial index for {} boundaries...",
            boundaries.len()
        );

        let mut by_id: HashMap<String, Arc<BoundaryPolygon>> = HashMap::new();
        let mut by_type: std::collections::BTreeMap<JurisdictionType, Vec<Arc<BoundaryPolygon>>> =
            std::collections::BTreeMap::new();
        let mut indexed = Vec::new();

        for boundary in boundaries {
            if by_id.contains_key(&boundary.id) {
                warn!("Skipping duplicate boundary id {}", boundary.id);
                continue;
            }
            let boundary = Arc::new(boundary);
            indexed.extend(IndexedBoundary::for_boundary(Arc::clone(&boundary)));
            by_type
                .entry(boundary.jurisdiction_type)
                .or_default()
                .push(Arc::clone(&boundary));
            by_id.insert(boundary.id.clone(), boundary);
        }

        let tree = RTree::bulk_load(indexed);

        info!(
            "Spatial index built with {} entries for {} boundaries",
            tree.size(),
            by_id.len()
        );
        for (jurisdiction_type, bounds) in &by_type {
            info!("  {}: {} boundaries", jurisdiction_type, bounds.len());
        }

        Self {
            tree,
            by_id,
            by_type: by_type.into_iter().collect(),
        }
    }

    /// Every boundary whose bounding box contains the point, deduplicated
    /// by id. A superset of the true matches.
    pub fn candidates(&self, point: &GeoPoint) -> Vec<Arc<BoundaryPolygon>> {
        let query_envelope = AABB::from_point([point.longitude, point.latitude]);
        let mut seen = HashSet::new();

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ib| seen.insert(ib.boundary.id.clone()))
            .map(|ib| Arc::clone(&ib.boundary))
            .collect()
    }

    /// Look up a boundary by id
    pub fn get(&self, id: &str) -> Option<&Arc<BoundaryPolygon>> {
        self.by_id.get(id)
    }

    /// Get all boundaries of a type (e.g., for debugging)
    pub fn boundaries_of_type(&self, jurisdiction_type: JurisdictionType) -> &[Arc<BoundaryPolygon>] {
        for (t, bounds) in &self.by_type {
            if *t == jurisdiction_type {
                return bounds;
            }
        }
        &[]
    }

    /// Get total number of indexed boundaries
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of R-tree entries (parts and antimeridian mirrors)
    pub fn entries(&self) -> usize {
        self.tree.size()
    }

    /// Iterate over all indexed boundaries
    pub fn boundaries(&self) -> impl Iterator<Item = &Arc<BoundaryPolygon>> {
        self.by_id.values()
    }
}
