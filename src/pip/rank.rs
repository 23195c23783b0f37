//! Ordering of overlapping jurisdictions.
//!
//! A point is routinely inside a city, its county and a fire district at
//! once. Precedence is municipal > county > state > fire district > other;
//! within a type the smaller (more specific) area wins; id breaks any
//! remaining tie so the order is stable across queries.

use std::cmp::Ordering;

use tracing::debug;

use super::{BoundaryPolygon, Match};
use crate::models::GeoPoint;

pub fn compare(a: &BoundaryPolygon, b: &BoundaryPolygon) -> Ordering {
    a.jurisdiction_type
        .cmp(&b.jurisdiction_type)
        .then_with(|| a.area.total_cmp(&b.area))
        .then_with(|| a.id.cmp(&b.id))
}

/// Order matches by precedence. The full set is returned; callers that
/// only draw one overlay take the first.
pub fn rank(point: &GeoPoint, mut matches: Vec<Match>) -> Vec<Match> {
    matches.sort_by(|a, b| compare(&a.boundary, &b.boundary));

    debug!(
        "Ranked {} jurisdictions at ({}, {}): [{}]",
        matches.len(),
        point.latitude,
        point.longitude,
        matches
            .iter()
            .map(|m| m.boundary.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JurisdictionType;
    use crate::pip::boundary::tests::square;
    use std::sync::Arc;

    fn m(boundary: BoundaryPolygon) -> Match {
        Match {
            boundary: Arc::new(boundary),
            part: 0,
            near_edge: false,
        }
    }

    fn ranked_ids(matches: Vec<Match>) -> Vec<String> {
        rank(&GeoPoint::new(0.0, 0.0), matches)
            .into_iter()
            .map(|m| m.boundary.id.clone())
            .collect()
    }

    #[test]
    fn test_city_before_county() {
        let ids = ranked_ids(vec![
            m(square("Q", JurisdictionType::County, 10.0)),
            m(square("C", JurisdictionType::Municipal, 1.0)),
        ]);
        assert_eq!(ids, vec!["C", "Q"]);
    }

    #[test]
    fn test_precedence_beats_area() {
        // A huge municipal boundary still outranks a tiny fire district
        let ids = ranked_ids(vec![
            m(square("fire", JurisdictionType::FireDistrict, 0.5)),
            m(square("other", JurisdictionType::Other, 0.1)),
            m(square("state", JurisdictionType::State, 20.0)),
            m(square("city", JurisdictionType::Municipal, 30.0)),
            m(square("county", JurisdictionType::County, 25.0)),
        ]);
        assert_eq!(ids, vec!["city", "county", "state", "fire", "other"]);
    }

    #[test]
    fn test_smaller_area_wins_within_type() {
        let ids = ranked_ids(vec![
            m(square("metro", JurisdictionType::Municipal, 3.0)),
            m(square("village", JurisdictionType::Municipal, 1.0)),
            m(square("twin-b", JurisdictionType::County, 2.0)),
            m(square("twin-a", JurisdictionType::County, 2.0)),
        ]);
        assert_eq!(ids, vec!["village", "metro", "twin-a", "twin-b"]);
    }

    #[test]
    fn test_empty() {
        assert!(ranked_ids(vec![]).is_empty());
    }
}
