//! Point-in-Polygon (PIP) jurisdiction lookup.
//!
//! Validated boundaries go into an R-tree keyed by part envelopes. A query
//! takes the bounding-box candidates, confirms containment exactly, ranks
//! overlapping jurisdictions and normalizes the winners for rendering.

mod boundary;
pub mod geometry;
mod index;
mod normalize;
#[cfg(test)]
mod proptests;
mod rank;
mod resolver;
mod service;

pub use boundary::{BoundaryPolygon, Coverage, Part, RawBoundary, RawGeometry};
pub use index::{IndexedBoundary, JurisdictionIndex};
pub use normalize::{normalize, normalize_match};
pub use rank::{compare, rank};
pub use resolver::{matches, Match};
pub use service::{JurisdictionService, Snapshot};
