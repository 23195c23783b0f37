//! Conversion from stored boundaries to the record renderers consume.
//!
//! Output vertices are always `[longitude, latitude]`, exterior rings are
//! counter-clockwise, holes clockwise, and every ring keeps its closing
//! vertex. A boundary that crosses
//! the antimeridian is emitted as its continuous ring, so longitudes may run
//! past +/-180 rather than jumping across the map.

use geo::orient::{Direction, Orient};
use geo::{Area, LineString, Polygon};

use super::{BoundaryPolygon, Coverage, Match};
use crate::models::ResolvedJurisdiction;

pub fn normalize(boundary: &BoundaryPolygon) -> ResolvedJurisdiction {
    let (boundary_ring, parts) = match &boundary.coverage {
        Coverage::Shape(parts) => {
            let oriented: Vec<Polygon<f64>> = parts
                .iter()
                .map(|part| part.polygon.orient(Direction::Default))
                .collect();
            let largest = oriented
                .iter()
                .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
                .map(|polygon| display_ring(polygon.exterior()))
                .unwrap_or_default();
            // A lone part without holes is fully described by `boundary`
            let has_holes = oriented.iter().any(|polygon| !polygon.interiors().is_empty());
            let rings = if oriented.len() > 1 || has_holes {
                oriented.iter().map(display_part).collect()
            } else {
                Vec::new()
            };
            (largest, rings)
        }
        // Agency known, shape unavailable: marker only
        Coverage::Extent { .. } => (Vec::new(), Vec::new()),
    };

    ResolvedJurisdiction {
        id: boundary.id.clone(),
        name: boundary.name.clone(),
        jurisdiction_type: boundary.jurisdiction_type,
        boundary: boundary_ring,
        parts,
        non_emergency_number: boundary.agency.phone.clone().unwrap_or_default(),
        website: boundary.agency.website.clone().unwrap_or_default(),
        near_edge: false,
    }
}

pub fn normalize_match(m: &Match) -> ResolvedJurisdiction {
    ResolvedJurisdiction {
        near_edge: m.near_edge,
        ..normalize(&m.boundary)
    }
}

fn display_ring(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

/// Outer ring followed by the holes
fn display_part(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(display_ring)
        .collect()
}
