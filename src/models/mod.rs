//! Data models for the Nearbook engine

pub mod credential;
pub mod geo;
pub mod library;

// Re-export commonly used types
pub use credential::Credential;
pub use geo::GeoPoint;
pub use library::{CandidateLibrary, LibraryRecord};
