//! Map overlay rendering capability.
//!
//! The resolver hands renderers `[lon, lat]` rings. Each renderer converts
//! them into the shape its map widget expects; the widget itself lives in
//! the client.

use serde::{Deserialize, Serialize};

use crate::models::{GeoPoint, ResolvedJurisdiction};

const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const DEFAULT_ZOOM: u8 = 13;
const STROKE_COLOR: &str = "#1e40af";
const FILL_OPACITY: f64 = 0.3;
const NATIVE_FILL_COLOR: &str = "rgba(30, 64, 175, 0.3)";
const REGION_LATITUDE_DELTA: f64 = 0.0922;
const REGION_LONGITUDE_DELTA: f64 = 0.0421;

/// Which map implementation draws the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    #[default]
    Web,
    Native,
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererKind::Web => write!(f, "web"),
            RendererKind::Native => write!(f, "native"),
        }
    }
}

/// Draws the user's location and the resolved jurisdictions
pub trait OverlayRenderer: Send + Sync {
    fn kind(&self) -> RendererKind;

    fn render_overlay(&self, location: &GeoPoint, jurisdictions: &[ResolvedJurisdiction])
        -> MapOverlay;
}

pub fn renderer_for(kind: RendererKind) -> Box<dyn OverlayRenderer> {
    match kind {
        RendererKind::Web => Box::new(LeafletRenderer),
        RendererKind::Native => Box::new(NativeRenderer),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "renderer", rename_all = "snake_case")]
pub enum MapOverlay {
    Web(LeafletMap),
    Native(NativeMap),
}

impl MapOverlay {
    /// Number of jurisdiction polygons drawn
    pub fn polygon_count(&self) -> usize {
        match self {
            MapOverlay::Web(map) => map.polygons.len(),
            MapOverlay::Native(map) => map.polygons.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafletMap {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
    pub marker: [f64; 2],
    pub polygons: Vec<LeafletPolygon>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafletPolygon {
    pub id: String,
    pub name: String,
    /// `[lat, lon]` rings nested as parts, then outer ring and holes.
    /// Leaflet reads this as a multi-polygon.
    pub positions: Vec<Vec<Vec<[f64; 2]>>>,
    pub color: &'static str,
    pub fill_opacity: f64,
}

/// Web maps via Leaflet, which takes `[lat, lon]` positions
pub struct LeafletRenderer;

impl OverlayRenderer for LeafletRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Web
    }

    fn render_overlay(
        &self,
        location: &GeoPoint,
        jurisdictions: &[ResolvedJurisdiction],
    ) -> MapOverlay {
        let position = [location.latitude, location.longitude];
        let polygons = jurisdictions
            .iter()
            .filter(|j| j.has_overlay())
            .map(|j| LeafletPolygon {
                id: j.id.clone(),
                name: j.name.clone(),
                positions: overlay_parts(j)
                    .into_iter()
                    .map(|rings| {
                        rings
                            .iter()
                            .map(|ring| ring.iter().map(|[lon, lat]| [*lat, *lon]).collect())
                            .collect()
                    })
                    .collect(),
                color: STROKE_COLOR,
                fill_opacity: FILL_OPACITY,
            })
            .collect();

        MapOverlay::Web(LeafletMap {
            center: position,
            zoom: DEFAULT_ZOOM,
            tile_url: OSM_TILE_URL,
            attribution: OSM_ATTRIBUTION,
            marker: position,
            polygons,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeMap {
    pub region: Region,
    pub marker: LatLng,
    pub polygons: Vec<NativePolygon>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativePolygon {
    pub id: String,
    pub name: String,
    pub coordinates: Vec<LatLng>,
    pub holes: Vec<Vec<LatLng>>,
    pub stroke_color: &'static str,
    pub fill_color: &'static str,
}

/// Native map views, which take `{ latitude, longitude }` objects
pub struct NativeRenderer;

impl OverlayRenderer for NativeRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Native
    }

    fn render_overlay(
        &self,
        location: &GeoPoint,
        jurisdictions: &[ResolvedJurisdiction],
    ) -> MapOverlay {
        // Native map views draw one polygon per part
        let polygons = jurisdictions
            .iter()
            .filter(|j| j.has_overlay())
            .flat_map(|j| {
                overlay_parts(j).into_iter().map(move |rings| {
                    let mut rings = rings.iter().map(|ring| lat_lng_ring(ring));
                    NativePolygon {
                        id: j.id.clone(),
                        name: j.name.clone(),
                        coordinates: rings.next().unwrap_or_default(),
                        holes: rings.collect(),
                        stroke_color: STROKE_COLOR,
                        fill_color: NATIVE_FILL_COLOR,
                    }
                })
            })
            .collect();

        MapOverlay::Native(NativeMap {
            region: Region {
                latitude: location.latitude,
                longitude: location.longitude,
                latitude_delta: REGION_LATITUDE_DELTA,
                longitude_delta: REGION_LONGITUDE_DELTA,
            },
            marker: LatLng {
                latitude: location.latitude,
                longitude: location.longitude,
            },
            polygons,
        })
    }
}

fn lat_lng_ring(ring: &[[f64; 2]]) -> Vec<LatLng> {
    ring.iter()
        .map(|[lon, lat]| LatLng {
            latitude: *lat,
            longitude: *lon,
        })
        .collect()
}

/// Rings of every part (outer first, then holes). Without `parts` the
/// single boundary ring is the only part.
fn overlay_parts(jurisdiction: &ResolvedJurisdiction) -> Vec<&[Vec<[f64; 2]>]> {
    if jurisdiction.parts.is_empty() {
        vec![std::slice::from_ref(&jurisdiction.boundary)]
    } else {
        jurisdiction.parts.iter().map(Vec::as_slice).collect()
    }
}
