//! Jurisdiction types, agency contact data and the resolved output record.

use serde::{Deserialize, Serialize};

/// Jurisdiction layer. Declaration order is ranking precedence
/// (municipal first), so the derived `Ord` is the precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionType {
    /// City / town / village police
    Municipal,
    /// County sheriff
    County,
    /// State patrol
    State,
    /// Fire / EMS district
    FireDistrict,
    /// Anything else (tribal, transit, campus police...)
    Other,
}

impl JurisdictionType {
    /// Parse a dataset tag. Unknown or missing tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "municipal" | "municipality" | "city" | "town" | "village" | "police" => {
                JurisdictionType::Municipal
            }
            "county" | "parish" | "borough" => JurisdictionType::County,
            "state" | "province" | "territory" => JurisdictionType::State,
            "fire_district" | "fire-district" | "fire" | "ems" => JurisdictionType::FireDistrict,
            _ => JurisdictionType::Other,
        }
    }

    /// Get all jurisdiction types in precedence order (municipal first)
    pub fn all() -> &'static [JurisdictionType] {
        &[
            JurisdictionType::Municipal,
            JurisdictionType::County,
            JurisdictionType::State,
            JurisdictionType::FireDistrict,
            JurisdictionType::Other,
        ]
    }

    /// Get the wire name for this type
    pub fn field_name(&self) -> &'static str {
        match self {
            JurisdictionType::Municipal => "municipal",
            JurisdictionType::County => "county",
            JurisdictionType::State => "state",
            JurisdictionType::FireDistrict => "fire_district",
            JurisdictionType::Other => "other",
        }
    }
}

impl std::fmt::Display for JurisdictionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Responsible agency contact data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Agency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
            website: None,
        }
    }
}

/// Output record consumed by renderers.
///
/// `boundary` and every ring in `parts` are `[longitude, latitude]` pairs.
/// Renderers apply one fixed swap to get their own order. An empty
/// `boundary` means the agency is known but the shape is not: draw the
/// marker only.
///
/// `boundary` is the outer ring of the largest part and carries no holes.
/// `parts` is filled when that is not the whole picture (several parts or
/// any hole): one entry per part, outer ring first, then its holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedJurisdiction {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub jurisdiction_type: JurisdictionType,
    pub boundary: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Vec<Vec<[f64; 2]>>>,
    pub non_emergency_number: String,
    pub website: String,
    /// The query's accuracy radius reaches this jurisdiction's edge
    #[serde(default)]
    pub near_edge: bool,
}

impl ResolvedJurisdiction {
    pub fn has_overlay(&self) -> bool {
        !self.boundary.is_empty()
    }
}
