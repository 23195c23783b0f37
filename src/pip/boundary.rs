//! Validated jurisdiction boundaries.
//!
//! Raw dataset records are checked against the ring invariants here and
//! converted to storage order (x = longitude, y = latitude). Rings that
//! cross the antimeridian are unwrapped and kept alongside a copy shifted
//! by 360 degrees so a query in [-180, 180] always lands on one of them.

use geo::{Area, BoundingRect, Coord, LineString, Polygon, Rect, Translate};

use super::geometry::{
    align_to, close_ring, distinct_vertices, edge_distance_meters, is_closed, polygon_contains,
    ring_position, unwrap_antimeridian, RingPosition,
};
use crate::error::{MalformedPolygon, MalformedReason};
use crate::models::{Agency, JurisdictionType};
use crate::store::{CoordinateOrder, LoadOptions};

/// A dataset record before validation
#[derive(Debug, Clone)]
pub struct RawBoundary {
    pub id: String,
    pub name: Option<String>,
    pub jurisdiction_type: JurisdictionType,
    pub agency: Agency,
    pub geometry: RawGeometry,
}

/// Geometry as found in the dataset, in the dataset's coordinate order
#[derive(Debug, Clone)]
pub enum RawGeometry {
    /// Polygons -> rings -> positions
    Polygons(Vec<Vec<Vec<Vec<f64>>>>),
    /// `[min, min, max, max]` only; the shape itself is unavailable
    Extent(Vec<f64>),
    Unsupported(String),
    Missing,
}

/// One outer ring with its holes
#[derive(Debug, Clone)]
pub struct Part {
    pub polygon: Polygon<f64>,
    /// Same polygon shifted by 360 degrees when it crosses the antimeridian
    pub mirror: Option<Polygon<f64>>,
}

impl Part {
    /// The stored polygon (original or mirror) containing the point
    pub fn containing_polygon(&self, point: Coord<f64>) -> Option<&Polygon<f64>> {
        std::iter::once(&self.polygon)
            .chain(self.mirror.as_ref())
            .find(|polygon| polygon_contains(point, polygon))
    }

    pub fn contains(&self, point: Coord<f64>) -> bool {
        self.containing_polygon(point).is_some()
    }

    pub fn envelopes(&self) -> impl Iterator<Item = Rect<f64>> + '_ {
        std::iter::once(&self.polygon)
            .chain(self.mirror.as_ref())
            .filter_map(|polygon| polygon.bounding_rect())
    }
}

/// What the store knows about a jurisdiction's area
#[derive(Debug, Clone)]
pub enum Coverage {
    Shape(Vec<Part>),
    /// Agency known, shape unavailable. A box crossing the antimeridian is
    /// stored east of it, past +180, with a copy shifted by -360.
    Extent {
        rect: Rect<f64>,
        mirror: Option<Rect<f64>>,
    },
}

impl Coverage {
    fn extent_rects(rect: &Rect<f64>, mirror: &Option<Rect<f64>>) -> impl Iterator<Item = Rect<f64>> {
        std::iter::once(*rect).chain(*mirror)
    }
}

/// A single validated jurisdiction boundary with its agency
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub id: String,
    pub name: String,
    pub jurisdiction_type: JurisdictionType,
    pub coverage: Coverage,
    pub agency: Agency,
    /// Planar area in square degrees, holes subtracted
    pub area: f64,
}

impl BoundaryPolygon {
    /// Validate a raw record. The error names the record and the first
    /// broken invariant.
    pub fn from_raw(raw: RawBoundary, options: &LoadOptions) -> Result<Self, MalformedPolygon> {
        let RawBoundary {
            id,
            name,
            jurisdiction_type,
            agency,
            geometry,
        } = raw;

        let coverage = match build_coverage(geometry, options) {
            Ok(coverage) => coverage,
            Err(reason) => return Err(MalformedPolygon::new(id, reason)),
        };

        let area = match &coverage {
            Coverage::Shape(parts) => parts.iter().map(|p| p.polygon.unsigned_area()).sum::<f64>(),
            Coverage::Extent { rect, .. } => rect.unsigned_area(),
        };

        let name = name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(agency.name.clone()).filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| id.clone());

        Ok(Self {
            id,
            name,
            jurisdiction_type,
            coverage,
            agency,
            area,
        })
    }

    /// Index of the part containing the point (closed-region semantics).
    /// An extent-only boundary has a single implicit part.
    pub fn locate(&self, point: Coord<f64>) -> Option<usize> {
        match &self.coverage {
            Coverage::Shape(parts) => parts.iter().position(|part| part.contains(point)),
            Coverage::Extent { rect, mirror } => Coverage::extent_rects(rect, mirror)
                .any(|r| rect_contains(&r, point))
                .then_some(0),
        }
    }

    pub fn contains(&self, point: Coord<f64>) -> bool {
        self.locate(point).is_some()
    }

    /// Bounding boxes to index, tagged with their part
    pub fn envelopes(&self) -> Vec<(usize, Rect<f64>)> {
        match &self.coverage {
            Coverage::Shape(parts) => parts
                .iter()
                .enumerate()
                .flat_map(|(i, part)| part.envelopes().map(move |rect| (i, rect)))
                .collect(),
            Coverage::Extent { rect, mirror } => Coverage::extent_rects(rect, mirror)
                .map(|r| (0, r))
                .collect(),
        }
    }

    /// `(min_lon, min_lat, max_lon, max_lat)` over the stored geometry.
    /// Mirrors are left out, so a crossing boundary reports a max past 180.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let rects: Vec<Rect<f64>> = match &self.coverage {
            Coverage::Shape(parts) => parts
                .iter()
                .filter_map(|part| part.polygon.bounding_rect())
                .collect(),
            Coverage::Extent { rect, .. } => vec![*rect],
        };
        rects
            .into_iter()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    }

    /// Distance in meters from a contained point to the edge of `part`
    pub fn edge_distance_meters(&self, part: usize, point: Coord<f64>) -> Option<f64> {
        match &self.coverage {
            Coverage::Shape(parts) => parts
                .get(part)?
                .containing_polygon(point)
                .map(|polygon| edge_distance_meters(point, polygon)),
            Coverage::Extent { rect, mirror } => Coverage::extent_rects(rect, mirror)
                .find(|r| rect_contains(r, point))
                .map(|r| edge_distance_meters(point, &r.to_polygon())),
        }
    }

    pub fn has_shape(&self) -> bool {
        matches!(self.coverage, Coverage::Shape(_))
    }
}

fn rect_contains(rect: &Rect<f64>, point: Coord<f64>) -> bool {
    point.x >= rect.min().x
        && point.x <= rect.max().x
        && point.y >= rect.min().y
        && point.y <= rect.max().y
}

fn build_coverage(geometry: RawGeometry, options: &LoadOptions) -> Result<Coverage, MalformedReason> {
    match geometry {
        RawGeometry::Polygons(polygons) => {
            if polygons.is_empty() {
                return Err(MalformedReason::EmptyPolygon);
            }
            let mut ring_no = 0;
            let mut parts = Vec::with_capacity(polygons.len());
            for rings in polygons {
                let mut converted = Vec::with_capacity(rings.len());
                for ring in rings {
                    converted.push((ring_no, convert_ring(ring, ring_no, options)?));
                    ring_no += 1;
                }
                parts.push(build_part(converted)?);
            }
            Ok(Coverage::Shape(parts))
        }
        RawGeometry::Extent(bbox) => build_extent(&bbox, options.coordinate_order),
        RawGeometry::Unsupported(kind) => Err(MalformedReason::UnsupportedGeometry(kind)),
        RawGeometry::Missing => Err(MalformedReason::MissingGeometry),
    }
}

fn to_coord(a: f64, b: f64, order: CoordinateOrder) -> Result<Coord<f64>, MalformedReason> {
    if !a.is_finite() || !b.is_finite() {
        return Err(MalformedReason::NonFiniteCoordinate);
    }
    let (lon, lat) = match order {
        CoordinateOrder::LonLat => (a, b),
        CoordinateOrder::LatLon => (b, a),
    };
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(MalformedReason::OutOfRange);
    }
    Ok(Coord { x: lon, y: lat })
}

fn convert_ring(
    positions: Vec<Vec<f64>>,
    ring_no: usize,
    options: &LoadOptions,
) -> Result<Vec<Coord<f64>>, MalformedReason> {
    let mut ring = positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [a, b, ..] => to_coord(*a, *b, options.coordinate_order),
            _ => Err(MalformedReason::NonFiniteCoordinate),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if distinct_vertices(&ring) < 3 {
        return Err(MalformedReason::TooFewVertices { ring: ring_no });
    }

    if !is_closed(&ring) {
        if options.strict_closure {
            return Err(MalformedReason::UnclosedRing { ring: ring_no });
        }
        close_ring(&mut ring);
    }

    Ok(ring)
}

/// First ring is the outer boundary, the rest are holes
fn build_part(rings: Vec<(usize, Vec<Coord<f64>>)>) -> Result<Part, MalformedReason> {
    let mut rings = rings.into_iter();
    let Some((_, outer)) = rings.next() else {
        return Err(MalformedReason::EmptyPolygon);
    };

    let (outer, mut crossed) = unwrap_antimeridian(&outer).ok_or(MalformedReason::EncirclesPole)?;
    let outer = LineString::new(outer);
    let reference_x = outer
        .bounding_rect()
        .map(|rect| rect.center().x)
        .unwrap_or_default();

    let mut holes = Vec::new();
    for (ring_no, hole) in rings {
        let (hole, hole_crossed) =
            unwrap_antimeridian(&hole).ok_or(MalformedReason::EncirclesPole)?;
        crossed |= hole_crossed;
        let hole = align_to(hole, reference_x);

        if hole
            .iter()
            .any(|c| ring_position(*c, &outer) == RingPosition::Outside)
        {
            return Err(MalformedReason::HoleOutsideOuter { ring: ring_no });
        }
        holes.push(LineString::new(hole));
    }

    let polygon = Polygon::new(outer, holes);
    let mirror = if crossed {
        polygon.bounding_rect().map(|rect| {
            let shift = if rect.max().x > 180.0 { -360.0 } else { 360.0 };
            polygon.translate(shift, 0.0)
        })
    } else {
        None
    };

    Ok(Part { polygon, mirror })
}

/// A west edge greater than the east edge is a box crossing the
/// antimeridian (RFC 7946 section 5.2).
fn build_extent(bbox: &[f64], order: CoordinateOrder) -> Result<Coverage, MalformedReason> {
    // GeoJSON allows a 3D bbox: [min_x, min_y, min_z, max_x, max_y, max_z]
    let (a0, b0, a1, b1) = match bbox {
        [a0, b0, a1, b1] => (*a0, *b0, *a1, *b1),
        [a0, b0, _, a1, b1, _] => (*a0, *b0, *a1, *b1),
        _ => return Err(MalformedReason::InvalidExtent),
    };
    let min = to_coord(a0, b0, order)?;
    let max = to_coord(a1, b1, order)?;
    if min.y > max.y {
        return Err(MalformedReason::InvalidExtent);
    }
    if min.x <= max.x {
        return Ok(Coverage::Extent {
            rect: Rect::new(min, max),
            mirror: None,
        });
    }

    let rect = Rect::new(min, Coord { x: max.x + 360.0, y: max.y });
    Ok(Coverage::Extent {
        rect,
        mirror: Some(rect.translate(-360.0, 0.0)),
    })
}
