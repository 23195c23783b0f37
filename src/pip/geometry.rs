//! Ring-level geometry on the lon/lat plane.
//!
//! Containment is even-odd ray casting with closed-region semantics: a point
//! lying on any edge counts as inside. The edge test runs before the ray so
//! boundary points resolve the same way on every query.

use std::f64::consts::PI;

use geo::{Coord, LineString, Polygon};
use hashbrown::HashSet;

/// Perpendicular distance (degrees) under which a point is on an edge
const EDGE_EPSILON: f64 = 1e-12;

/// Mean earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Where a point sits relative to a single ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPosition {
    Inside,
    OnEdge,
    Outside,
}

/// Append the first vertex if the ring is not explicitly closed.
/// Returns true if a closing vertex was added.
pub fn close_ring(ring: &mut Vec<Coord<f64>>) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first != last => {
            let first = *first;
            ring.push(first);
            true
        }
        _ => false,
    }
}

pub fn is_closed(ring: &[Coord<f64>]) -> bool {
    ring.len() >= 2 && ring.first() == ring.last()
}

/// Number of distinct vertices (closing vertex and repeats collapse)
pub fn distinct_vertices(ring: &[Coord<f64>]) -> usize {
    ring.iter()
        // + 0.0 folds -0.0 into 0.0
        .map(|c| ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits()))
        .collect::<HashSet<_>>()
        .len()
}

fn on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return p == a;
    }

    let cross = dx * (p.y - a.y) - dy * (p.x - a.x);
    if cross.abs() > EDGE_EPSILON * len {
        return false;
    }

    p.x >= a.x.min(b.x) - EDGE_EPSILON
        && p.x <= a.x.max(b.x) + EDGE_EPSILON
        && p.y >= a.y.min(b.y) - EDGE_EPSILON
        && p.y <= a.y.max(b.y) + EDGE_EPSILON
}

/// Classify a point against one closed ring
pub fn ring_position(point: Coord<f64>, ring: &LineString<f64>) -> RingPosition {
    if ring
        .lines()
        .any(|line| on_segment(point, line.start, line.end))
    {
        return RingPosition::OnEdge;
    }

    let mut inside = false;
    for line in ring.lines() {
        let (a, b) = (line.start, line.end);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }

    if inside {
        RingPosition::Inside
    } else {
        RingPosition::Outside
    }
}

/// Inside (or on) the exterior and not strictly inside any hole
pub fn polygon_contains(point: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    match ring_position(point, polygon.exterior()) {
        RingPosition::Outside => false,
        RingPosition::OnEdge => true,
        RingPosition::Inside => polygon
            .interiors()
            .iter()
            .all(|hole| ring_position(point, hole) != RingPosition::Inside),
    }
}

/// Make a ring continuous across the antimeridian.
///
/// Every jump of more than 180 degrees between consecutive vertices is
/// undone by offsetting the rest of the ring by 360. Returns the unwrapped
/// ring and whether any offset was applied, or `None` when the unwrapped
/// ring no longer closes (it winds around a pole).
pub fn unwrap_antimeridian(ring: &[Coord<f64>]) -> Option<(Vec<Coord<f64>>, bool)> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    let mut offset = 0.0;
    let mut crossed = false;

    for c in ring {
        if let Some(prev) = out.last() {
            let delta = c.x + offset - prev.x;
            if delta > 180.0 {
                offset -= 360.0;
                crossed = true;
            } else if delta < -180.0 {
                offset += 360.0;
                crossed = true;
            }
        }
        out.push(Coord {
            x: c.x + offset,
            y: c.y,
        });
    }

    match (out.first(), out.last()) {
        (Some(first), Some(last)) if (first.x - last.x).abs() > 1e-9 || first.y != last.y => None,
        _ => Some((out, crossed)),
    }
}

/// Shift a ring by whole turns so it lies within 180 degrees of `reference_x`
pub fn align_to(ring: Vec<Coord<f64>>, reference_x: f64) -> Vec<Coord<f64>> {
    let Some(first) = ring.first() else {
        return ring;
    };
    let turns = ((reference_x - first.x) / 360.0).round();
    if turns == 0.0 {
        return ring;
    }
    let dx = turns * 360.0;
    ring.into_iter()
        .map(|c| Coord { x: c.x + dx, y: c.y })
        .collect()
}

/// Shortest distance in meters from `point` to any edge of `polygon`,
/// using an equirectangular projection centred on the point.
pub fn edge_distance_meters(point: Coord<f64>, polygon: &Polygon<f64>) -> f64 {
    let scale_y = EARTH_RADIUS_M * PI / 180.0;
    let scale_x = scale_y * point.y.to_radians().cos();
    let project = |c: Coord<f64>| Coord {
        x: (c.x - point.x) * scale_x,
        y: (c.y - point.y) * scale_y,
    };

    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(|ring| ring.lines())
        .map(|line| distance_to_origin(project(line.start), project(line.end)))
        .fold(f64::INFINITY, f64::min)
}

fn distance_to_origin(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return a.x.hypot(a.y);
    }
    let t = (-(a.x * dx + a.y * dy) / len2).clamp(0.0, 1.0);
    (a.x + t * dx).hypot(a.y + t * dy)
}
