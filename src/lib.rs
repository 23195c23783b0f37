//! Precinct - jurisdiction resolution for raw GPS points
//!
//! This library provides the boundary store, spatial index and resolver
//! shared by the serve and inspect binaries.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod pip;
pub mod render;
pub mod store;

pub use error::{MalformedPolygon, MalformedReason, ResolveError, StoreError};
pub use models::{Agency, GeoPoint, JurisdictionType, ResolvedJurisdiction};
pub use pip::JurisdictionService;
pub use store::{BoundarySource, BoundaryStore, LoadOptions};
