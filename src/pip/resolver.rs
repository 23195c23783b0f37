//! Exact containment over spatial-index candidates.

use std::sync::Arc;

use super::BoundaryPolygon;
use crate::models::GeoPoint;

/// A boundary confirmed to contain the query point
#[derive(Debug, Clone)]
pub struct Match {
    pub boundary: Arc<BoundaryPolygon>,
    /// Part of a multi-part boundary that contains the point
    pub part: usize,
    /// The point's accuracy radius reaches the part's edge
    pub near_edge: bool,
}

/// Keep the candidates that actually contain the point. Points on an edge
/// are inside. No candidates means no matches, never an error.
pub fn matches(point: &GeoPoint, candidates: Vec<Arc<BoundaryPolygon>>) -> Vec<Match> {
    let coord = point.coord();

    candidates
        .into_iter()
        .filter_map(|boundary| {
            let part = boundary.locate(coord)?;
            let near_edge = point
                .accuracy_meters
                .and_then(|accuracy| {
                    boundary
                        .edge_distance_meters(part, coord)
                        .map(|distance| distance <= accuracy)
                })
                .unwrap_or(false);
            Some(Match {
                boundary,
                part,
                near_edge,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JurisdictionType;
    use crate::pip::boundary::tests::square;

    fn p1() -> Vec<Arc<BoundaryPolygon>> {
        vec![Arc::new(square("p1", JurisdictionType::Municipal, 1.0))]
    }

    #[test]
    fn test_square_scenario() {
        assert_eq!(matches(&GeoPoint::new(0.0, 0.0), p1()).len(), 1);
        assert!(matches(&GeoPoint::new(2.0, 2.0), p1()).is_empty());
        assert_eq!(matches(&GeoPoint::new(0.0, 1.0), p1()).len(), 1);
        assert_eq!(matches(&GeoPoint::new(1.0, 0.0), p1()).len(), 1);
    }

    #[test]
    fn test_no_candidates() {
        assert!(matches(&GeoPoint::new(0.0, 0.0), vec![]).is_empty());
    }

    #[test]
    fn test_near_edge() {
        // 0.001 degrees from the north edge, roughly 111 m
        let near = GeoPoint::new(0.999, 0.0).with_accuracy(150.0);
        let m = matches(&near, p1());
        assert!(m[0].near_edge);

        let precise = GeoPoint::new(0.999, 0.0).with_accuracy(50.0);
        assert!(!matches(&precise, p1())[0].near_edge);

        let unknown = GeoPoint::new(0.999, 0.0);
        assert!(!matches(&unknown, p1())[0].near_edge);
    }
}
