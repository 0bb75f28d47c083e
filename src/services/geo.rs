//! Distance filtering of the library catalog.
//!
//! Pure and synchronous: given the requester's position and a catalog
//! snapshot, select the libraries within the search radius.

use crate::models::{CandidateLibrary, GeoPoint, LibraryRecord};

/// Select catalog entries within `radius_km` of the requester.
///
/// The radius check is a closed interval: a library exactly at the radius is
/// included. Records whose stored coordinates do not parse are skipped, not
/// errors — one bad catalog row must not abort the whole resolution. Output
/// order is unspecified.
pub fn nearby_candidates(
    requester: &GeoPoint,
    catalog: &[LibraryRecord],
    radius_km: f64,
) -> Vec<CandidateLibrary> {
    catalog
        .iter()
        .filter_map(|record| {
            let location = match record.location() {
                Some(location) => location,
                None => {
                    tracing::debug!(
                        library = %record.code,
                        latitude = %record.latitude,
                        longitude = %record.longitude,
                        "skipping catalog record with unparseable coordinates"
                    );
                    return None;
                }
            };

            let distance_km = requester.distance_km(&location);
            (distance_km <= radius_km).then(|| CandidateLibrary {
                record: record.clone(),
                distance_km,
            })
        })
        .collect()
}
