//! Curator gateway: the four operations the rest of the crate may call.

use super::backend::GenerativeBackend;
use super::error::CuratorError;
use super::parse::{extract_json, parse_discovery, parse_geocode};
use super::retry::{with_retry, RetryPolicy};
use super::types::{
    CuratorRequest, DiscoveryBatch, ExpertAnswer, LocationQuery, ResolvedLocation,
    CURRENT_LOCATION_NAME,
};
use crate::geo::Coordinate;

/// Default radius stated to the curator, in kilometers.
const DEFAULT_SEARCH_RADIUS_KM: f64 = 50.0;

/// Resilient client around a generative backend.
pub struct CuratorClient<B> {
    backend: B,
    retry: RetryPolicy,
    /// Radius stated in search-parks requests; advisory only
    search_radius_km: f64,
}

impl<B: GenerativeBackend> CuratorClient<B> {
    pub fn new(backend: B, retry: RetryPolicy) -> Self {
        Self {
            backend,
            retry,
            search_radius_km: DEFAULT_SEARCH_RADIUS_KM,
        }
    }

    pub fn with_search_radius(mut self, radius_km: f64) -> Self {
        self.search_radius_km = radius_km;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolve a query to a search origin.
    ///
    /// Device fixes pass straight through without a backend call.
    pub async fn resolve_location(
        &self,
        query: &LocationQuery,
    ) -> Result<ResolvedLocation, CuratorError> {
        let text = match query {
            LocationQuery::Gps(coordinate) => {
                if !coordinate.is_valid() {
                    return Err(CuratorError::NoMatch(coordinate.to_string()));
                }
                return Ok(ResolvedLocation {
                    coordinate: *coordinate,
                    display_name: CURRENT_LOCATION_NAME.to_string(),
                });
            }
            LocationQuery::Text(text) => text.trim(),
        };

        if text.is_empty() {
            return Err(CuratorError::NoMatch(String::new()));
        }

        let request = CuratorRequest::Geocode {
            query: text.to_string(),
        };

        let resolved = with_retry(&self.retry, request.task(), || async {
            let reply = self.backend.generate(&request).await?;
            let value = extract_json(&reply.text)?;
            parse_geocode(&value, text)
        })
        .await?;

        tracing::info!(
            "Resolved {} to {} ({}) via {}",
            query,
            resolved.display_name,
            resolved.coordinate,
            self.backend.name()
        );
        Ok(resolved)
    }

    /// Ask the curator for candidate locations around `origin`.
    ///
    /// The stated radius is advisory; callers must re-check distances.
    /// A reply that never yields usable JSON becomes an empty batch.
    pub async fn discover_locations(
        &self,
        origin: Coordinate,
        display_name: &str,
    ) -> Result<DiscoveryBatch, CuratorError> {
        let request = CuratorRequest::SearchParks {
            lat: origin.lat,
            lng: origin.lng,
            location_name: display_name.to_string(),
            radius_km: self.search_radius_km,
        };

        let value = with_retry(&self.retry, request.task(), || async {
            let reply = self.backend.generate(&request).await?;
            extract_json(&reply.text)
        })
        .await;

        let value = match value {
            Ok(value) => value,
            Err(CuratorError::Malformed(reason)) => {
                tracing::warn!("Curator discovery reply unusable ({}); no candidates", reason);
                return Ok(DiscoveryBatch::default());
            }
            Err(e) => return Err(e),
        };

        let batch = parse_discovery(&value);
        if batch.dropped > 0 {
            tracing::info!(
                "Curator proposed {} candidates, {} failed validation",
                batch.candidates.len() + batch.dropped,
                batch.dropped
            );
        }
        Ok(batch)
    }

    /// Answer a free-form question, with the web sources used.
    pub async fn answer_question(&self, text: &str) -> Result<ExpertAnswer, CuratorError> {
        let request = CuratorRequest::ExpertAdvice {
            question: text.trim().to_string(),
        };

        let reply = with_retry(&self.retry, request.task(), || async {
            let reply = self.backend.generate(&request).await?;
            if reply.text.trim().is_empty() {
                return Err(CuratorError::Malformed("empty answer".to_string()));
            }
            Ok(reply)
        })
        .await?;

        Ok(ExpertAnswer {
            answer: reply.text.trim().to_string(),
            citations: reply.citations,
        })
    }

    /// Background story for a location.
    pub async fn elaborate(&self, name: &str, place: &str) -> Result<String, CuratorError> {
        let request = CuratorRequest::DeepDive {
            artwork_name: name.to_string(),
            location: place.to_string(),
        };

        with_retry(&self.retry, request.task(), || async {
            let reply = self.backend.generate(&request).await?;
            let text = reply.text.trim();
            if text.is_empty() {
                return Err(CuratorError::Malformed("empty elaboration".to_string()));
            }
            Ok(text.to_string())
        })
        .await
    }
}
