//! Library catalog entry models.

use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// One entry of the library catalog, as held by the catalog store.
///
/// Coordinates stay in their stored string form; they are parsed per record
/// during distance filtering, and records whose coordinates do not parse are
/// skipped rather than failing the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRecord {
    /// Provider-assigned library code, opaque to the engine.
    pub code: String,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

impl LibraryRecord {
    /// Parsed location, or `None` when the stored coordinates are malformed.
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::parse(&self.latitude, &self.longitude)
    }
}

/// A catalog entry within the requester's search radius. Lives only for the
/// duration of one resolution request.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLibrary {
    pub record: LibraryRecord,
    pub distance_km: f64,
}
