//! Merge, filter, deduplicate and rank candidates for one origin.
//!
//! Pipeline order:
//! 1. pool = catalog records, then curator records
//! 2. distance from the origin for every candidate
//! 3. deduplication over the whole pool, catalog records first
//! 4. radius filter (`distance <= R`), same rule for both sources
//! 5. stable sort by distance
//! 6. cap
//!
//! Deduplicating before filtering makes the radius pick a subset of one
//! fixed set, so a smaller radius never yields more results.
//!
//! Everything here is deterministic for a given origin and input order.

use serde::Serialize;
use url::Url;

use crate::catalog::LocationRecord;
use crate::geo::{self, Coordinate};
use crate::storage::config::DiscoverySettings;

/// A record ranked against one search origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLocation {
    #[serde(flatten)]
    pub record: LocationRecord,
    /// Distance from `search_origin`; meaningless for any other origin
    pub distance_km: f64,
    /// The exact origin the distance was computed from
    pub search_origin: Coordinate,
}

impl RankedLocation {
    /// Rank `record` against `origin`.
    pub fn new(record: LocationRecord, origin: Coordinate) -> Self {
        let distance_km = origin.distance_to(&record.coordinate());
        Self {
            record,
            distance_km,
            search_origin: origin,
        }
    }

    /// Directions from the search origin to this location.
    pub fn route_url(&self) -> Result<Url, url::ParseError> {
        geo::directions_url(self.search_origin, self.record.coordinate())
    }
}

/// Whether two candidates are the same real-world place.
///
/// Either they lie closer than the duplicate threshold, or one name
/// contains the other after case-folding.
pub fn is_same_place(a: &LocationRecord, b: &LocationRecord, settings: &DiscoverySettings) -> bool {
    let distance = geo::distance_km(a.coordinate(), b.coordinate());
    if distance < settings.duplicate_threshold_km {
        return true;
    }

    let (name_a, name_b) = (a.folded_name(), b.folded_name());
    if name_a.is_empty() || name_b.is_empty() {
        return false;
    }
    let names_match = name_a.contains(&name_b) || name_b.contains(&name_a);

    match settings.name_match_max_km {
        Some(limit) => names_match && distance < limit,
        None => names_match,
    }
}

/// Keep one candidate per real-world place.
///
/// Catalog records are considered before curator records, so a catalog
/// record always wins a cross-source pair; otherwise the first one seen wins.
pub fn deduplicate(
    candidates: Vec<RankedLocation>,
    settings: &DiscoverySettings,
) -> Vec<RankedLocation> {
    let (catalog, discovered): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|c| c.record.is_catalog());

    let mut kept: Vec<RankedLocation> = Vec::with_capacity(catalog.len() + discovered.len());
    for candidate in catalog.into_iter().chain(discovered) {
        let duplicate_of = kept
            .iter()
            .find(|existing| is_same_place(&existing.record, &candidate.record, settings));

        match duplicate_of {
            Some(existing) => tracing::debug!(
                "'{}' ({}) duplicates '{}' ({})",
                candidate.record.name,
                candidate.record.source,
                existing.record.name,
                existing.record.source
            ),
            None => kept.push(candidate),
        }
    }
    kept
}

/// Produce the final ranked list for `origin`.
pub fn reconcile(
    origin: Coordinate,
    catalog: &[LocationRecord],
    discovered: &[LocationRecord],
    settings: &DiscoverySettings,
) -> Vec<RankedLocation> {
    let radius = settings.search_radius_km;

    let pool: Vec<RankedLocation> = catalog
        .iter()
        .chain(discovered)
        .cloned()
        .map(|record| RankedLocation::new(record, origin))
        .collect();

    let mut within_radius: Vec<RankedLocation> = deduplicate(pool, settings)
        .into_iter()
        .filter(|ranked| ranked.distance_km <= radius)
        .collect();
    within_radius.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    within_radius.truncate(settings.max_results);
    within_radius
}
