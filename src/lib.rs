//! SculptuurRadar - Sculpture Park Discovery
//!
//! Finds sculpture parks, open-air museums and monumental works near a place
//! or a device fix. Results combine a bundled reference catalog with
//! candidates proposed by a generative curator, filtered to a search radius,
//! deduplicated and ranked by great-circle distance.

pub mod catalog;
pub mod curator;
pub mod discovery;
pub mod geo;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use catalog::{Catalog, LocationRecord, Source};
pub use curator::{Backend, CuratorClient, CuratorError, LocationQuery};
pub use discovery::{DiscoveryEngine, RankedLocation, SearchError, SearchOutcome};
pub use geo::Coordinate;
pub use session::{SearchSession, SessionState};
pub use storage::config::AppConfig;
