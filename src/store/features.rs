//! GeoJSON feature extraction.
//!
//! Recognized feature properties: `id`, `name`, `jurisdiction_type` (or
//! `type`), `agency_name`, `phone` (or `non_emergency_number`), `website`,
//! and an optional nested `agency` object with `name`/`phone`/`website`.

use geojson::{feature::Id, Feature, GeoJson, JsonObject, Value};
use tracing::debug;

use crate::error::{MalformedPolygon, MalformedReason, StoreError};
use crate::models::{Agency, JurisdictionType};
use crate::pip::{RawBoundary, RawGeometry};

/// Parse a FeatureCollection (or a lone Feature) into raw boundary records.
///
/// Only document-level problems are errors; a bad feature becomes an `Err`
/// entry so the rest of the dataset still loads.
pub fn parse_features(input: &str) -> Result<Vec<Result<RawBoundary, MalformedPolygon>>, StoreError> {
    let features = match input.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => return Err(StoreError::NotFeatureCollection),
    };

    debug!("Parsed {} GeoJSON features", features.len());

    Ok(features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| extract_boundary(i, feature))
        .collect())
}

fn extract_boundary(index: usize, feature: Feature) -> Result<RawBoundary, MalformedPolygon> {
    let properties = feature.properties.clone().unwrap_or_default();

    let id = property_id(&properties)
        .or_else(|| feature.id.as_ref().map(id_to_string))
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| MalformedPolygon::new(format!("feature[{index}]"), MalformedReason::MissingId))?;

    let jurisdiction_type = string_property(&properties, &["jurisdiction_type", "type"])
        .map(|tag| JurisdictionType::from_tag(&tag))
        .unwrap_or(JurisdictionType::Other);

    let geometry = match (feature.geometry, feature.bbox) {
        (Some(geometry), _) => match geometry.value {
            Value::Polygon(rings) => RawGeometry::Polygons(vec![rings]),
            Value::MultiPolygon(polygons) => RawGeometry::Polygons(polygons),
            other => RawGeometry::Unsupported(geometry_type(&other).to_string()),
        },
        (None, Some(bbox)) => RawGeometry::Extent(bbox),
        (None, None) => RawGeometry::Missing,
    };

    Ok(RawBoundary {
        id,
        name: string_property(&properties, &["name"]),
        jurisdiction_type,
        agency: agency(&properties),
        geometry,
    })
}

fn agency(properties: &JsonObject) -> Agency {
    let nested = properties
        .get("agency")
        .and_then(|value| value.as_object())
        .cloned()
        .unwrap_or_default();

    Agency {
        name: string_property(&nested, &["name"])
            .or_else(|| string_property(properties, &["agency_name", "agency"]))
            .unwrap_or_default(),
        phone: string_property(&nested, &["phone"])
            .or_else(|| string_property(properties, &["phone", "non_emergency_number", "nonEmergencyNumber"])),
        website: string_property(&nested, &["website"])
            .or_else(|| string_property(properties, &["website"])),
    }
}

fn string_property(properties: &JsonObject, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| value.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn property_id(properties: &JsonObject) -> Option<String> {
    match properties.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_to_string(id: &Id) -> String {
    match id {
        Id::String(s) => s.clone(),
        Id::Number(n) => n.to_string(),
    }
}

fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
