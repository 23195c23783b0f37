//! Core data models for jurisdiction resolution.

pub mod jurisdiction;
pub mod point;

pub use jurisdiction::{Agency, JurisdictionType, ResolvedJurisdiction};
pub use point::GeoPoint;
