//! Property tests for containment, candidate filtering and ranking.

use std::f64::consts::PI;
use std::sync::Arc;

use proptest::prelude::*;

use super::boundary::tests::{raw, square_ring};
use super::{matches, BoundaryPolygon, JurisdictionIndex, JurisdictionService};
use crate::models::{GeoPoint, JurisdictionType};
use crate::store::LoadOptions;

fn polygon(id: &str, jurisdiction_type: JurisdictionType, rings: Vec<Vec<Vec<f64>>>) -> BoundaryPolygon {
    BoundaryPolygon::from_raw(raw(id, jurisdiction_type, rings), &LoadOptions::default()).unwrap()
}

fn contains(boundary: BoundaryPolygon, lon: f64, lat: f64) -> bool {
    !matches(&GeoPoint::new(lat, lon), vec![Arc::new(boundary)]).is_empty()
}

/// Closed regular polygon around `(cx, cy)` with circumradius `r`
fn regular_ring(cx: f64, cy: f64, r: f64, sides: usize, phase: f64) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = (0..sides)
        .map(|i| {
            let angle = phase + 2.0 * PI * i as f64 / sides as f64;
            vec![cx + r * angle.cos(), cy + r * angle.sin()]
        })
        .collect();
    ring.push(ring[0].clone());
    ring
}

proptest! {
    /// Property: a rectangle with a hole contains every point of its
    /// closed area except those strictly inside the hole.
    #[test]
    fn prop_rect_with_hole(
        x0 in -170.0f64..160.0f64,
        y0 in -80.0f64..70.0f64,
        w in 0.01f64..10.0f64,
        h in 0.01f64..10.0f64,
        fx in 0.0f64..=1.0f64,
        fy in 0.0f64..=1.0f64,
    ) {
        let (hx0, hx1) = (x0 + w / 3.0, x0 + 2.0 * w / 3.0);
        let (hy0, hy1) = (y0 + h / 3.0, y0 + 2.0 * h / 3.0);
        let (px, py) = (x0 + fx * w, y0 + fy * h);
        // Within rounding distance of a hole edge the answer is ambiguous
        prop_assume!([hx0, hx1].iter().all(|x| (px - x).abs() > 1e-9));
        prop_assume!([hy0, hy1].iter().all(|y| (py - y).abs() > 1e-9));

        let boundary = polygon(
            "holed",
            JurisdictionType::County,
            vec![square_ring(x0, y0, x0 + w, y0 + h), square_ring(hx0, hy0, hx1, hy1)],
        );
        let in_hole = px > hx0 && px < hx1 && py > hy0 && py < hy1;
        prop_assert_eq!(contains(boundary, px, py), !in_hole);
    }

    /// Property: a regular polygon contains its inscribed circle and
    /// excludes everything beyond its circumscribed circle.
    #[test]
    fn prop_regular_polygon(
        cx in -100.0f64..100.0f64,
        cy in -60.0f64..60.0f64,
        r in 0.01f64..5.0f64,
        sides in 3usize..12,
        phase in 0.0f64..(2.0 * PI),
        angle in 0.0f64..(2.0 * PI),
        t in 0.0f64..0.99f64,
        beyond in 1.01f64..3.0f64,
    ) {
        let apothem = r * (PI / sides as f64).cos();
        let ring = regular_ring(cx, cy, r, sides, phase);

        let inner = (cx + t * apothem * angle.cos(), cy + t * apothem * angle.sin());
        let boundary = polygon("ngon", JurisdictionType::Municipal, vec![ring.clone()]);
        prop_assert!(contains(boundary, inner.0, inner.1));

        let outer = (cx + beyond * r * angle.cos(), cy + beyond * r * angle.sin());
        let boundary = polygon("ngon", JurisdictionType::Municipal, vec![ring]);
        prop_assert!(!contains(boundary, outer.0, outer.1));
    }

    /// Property: a point outside every bounding box yields no candidates.
    #[test]
    fn prop_outside_bbox_has_no_candidates(
        x0 in -170.0f64..160.0f64,
        y0 in -80.0f64..70.0f64,
        w in 0.01f64..10.0f64,
        h in 0.01f64..10.0f64,
        side in 0usize..4,
        gap in 0.001f64..50.0f64,
        along in 0.0f64..=1.0f64,
    ) {
        let index = JurisdictionIndex::build(vec![polygon(
            "box",
            JurisdictionType::FireDistrict,
            vec![square_ring(x0, y0, x0 + w, y0 + h)],
        )]);
        let (px, py) = match side {
            0 => (x0 - gap, y0 + along * h),
            1 => (x0 + w + gap, y0 + along * h),
            2 => (x0 + along * w, y0 - gap),
            _ => (x0 + along * w, y0 + h + gap),
        };
        prop_assert!(index.candidates(&GeoPoint::new(py, px)).is_empty());
    }

    /// Property: points on an edge, including a sloped one, are contained.
    #[test]
    fn prop_edge_points_are_contained(
        x0 in -100.0f64..100.0f64,
        y0 in -60.0f64..60.0f64,
        a in 0.1f64..10.0f64,
        b in 0.1f64..10.0f64,
        t in 0.0f64..=1.0f64,
    ) {
        let triangle = vec![
            vec![x0, y0],
            vec![x0 + a, y0],
            vec![x0, y0 + b],
            vec![x0, y0],
        ];
        let edge_points = [
            (x0 + t * a, y0),
            (x0, y0 + t * b),
            (x0 + a * (1.0 - t), y0 + b * t),
        ];
        for (px, py) in edge_points {
            let boundary = polygon("wedge", JurisdictionType::State, vec![triangle.clone()]);
            prop_assert!(contains(boundary, px, py), "({}, {}) not contained", px, py);
        }
    }

    /// Property: a city inside a county always resolves city first.
    #[test]
    fn prop_nested_city_ranks_first(
        x0 in -170.0f64..160.0f64,
        y0 in -80.0f64..70.0f64,
        w in 0.1f64..10.0f64,
        h in 0.1f64..10.0f64,
        lo in 0.05f64..0.4f64,
        hi in 0.6f64..0.95f64,
        fx in 0.0f64..=1.0f64,
        fy in 0.0f64..=1.0f64,
    ) {
        let (cx0, cx1) = (x0 + lo * w, x0 + hi * w);
        let (cy0, cy1) = (y0 + lo * h, y0 + hi * h);
        let service = JurisdictionService::new(JurisdictionIndex::build(vec![
            polygon("county", JurisdictionType::County, vec![square_ring(x0, y0, x0 + w, y0 + h)]),
            polygon("city", JurisdictionType::Municipal, vec![square_ring(cx0, cy0, cx1, cy1)]),
        ]));

        let point = GeoPoint::new(cy0 + fy * (cy1 - cy0), cx0 + fx * (cx1 - cx0));
        let ids: Vec<String> = service
            .resolve(point)
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        prop_assert_eq!(ids, vec!["city".to_string(), "county".to_string()]);
    }

    /// Property: a box straddling the antimeridian contains points on
    /// both sides of it.
    #[test]
    fn prop_antimeridian_box(
        west in 0.1f64..20.0f64,
        east in 0.1f64..20.0f64,
        y0 in -60.0f64..50.0f64,
        h in 0.1f64..10.0f64,
        f in 0.01f64..0.99f64,
        fy in 0.01f64..0.99f64,
    ) {
        let ring = vec![
            vec![180.0 - west, y0],
            vec![180.0 - west, y0 + h],
            vec![-180.0 + east, y0 + h],
            vec![-180.0 + east, y0],
            vec![180.0 - west, y0],
        ];
        let lat = y0 + fy * h;
        for lon in [180.0 - f * west, -180.0 + f * east] {
            let boundary = polygon("strait", JurisdictionType::FireDistrict, vec![ring.clone()]);
            prop_assert!(contains(boundary, lon, lat), "lon {} not contained", lon);
        }
    }
}
