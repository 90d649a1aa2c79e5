//! Discovery orchestrator.
//!
//! Resolves a query to an origin, asks the curator for candidates around
//! it, and reconciles them with the reference catalog. A failed resolution
//! aborts the search; a failed discovery degrades to catalog-only results.

pub mod reconcile;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::curator::{CuratorClient, CuratorError, GenerativeBackend, LocationQuery};
use crate::geo::Coordinate;

pub use crate::storage::config::DiscoverySettings;
pub use reconcile::{deduplicate, is_same_place, reconcile, RankedLocation};

/// Search failures as presented to the user.
///
/// Display text is fixed per kind; backend messages never reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum SearchError {
    #[error("Location not found.")]
    NotFound,

    #[error("The curator is not configured. Set an API key and try again.")]
    Configuration,

    #[error("The curator has reached its usage limit. Try again later.")]
    QuotaExceeded,

    #[error("The curator could not be reached. Try again in a moment.")]
    Transient,
}

impl SearchError {
    /// Map a failed location resolution.
    pub fn from_resolution(err: &CuratorError) -> Self {
        match err {
            CuratorError::Configuration(_) | CuratorError::InvalidCredential => {
                SearchError::Configuration
            }
            CuratorError::QuotaExceeded => SearchError::QuotaExceeded,
            CuratorError::Transient(_) => SearchError::Transient,
            CuratorError::Malformed(_) | CuratorError::NoMatch(_) | CuratorError::Rejected(_) => {
                SearchError::NotFound
            }
        }
    }

    /// Message safe to show to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Why a search fell back to catalog-only results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// Curator rate limit or quota
    QuotaExceeded,
    /// Curator credential missing or rejected
    NotConfigured,
    /// Any other discovery failure
    CuratorUnavailable,
}

impl Degradation {
    fn from_discovery(err: &CuratorError) -> Self {
        match err {
            CuratorError::QuotaExceeded => Degradation::QuotaExceeded,
            e if e.is_configuration() => Degradation::NotConfigured,
            _ => Degradation::CuratorUnavailable,
        }
    }

    pub fn notice(&self) -> &'static str {
        match self {
            Degradation::QuotaExceeded => {
                "The curator has reached its limit; showing results from our own catalog."
            }
            Degradation::NotConfigured => {
                "The curator is not configured; showing results from our own catalog."
            }
            Degradation::CuratorUnavailable => {
                "The curator is unavailable; showing results from our own catalog."
            }
        }
    }
}

/// Result of one completed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub query: LocationQuery,
    pub origin: Coordinate,
    pub display_name: String,
    pub curator_note: Option<String>,
    pub results: Vec<RankedLocation>,
    /// Set when curator candidates were unavailable
    pub degradation: Option<Degradation>,
    /// Curator candidates that passed validation, before reconciliation
    pub discovered_count: usize,
    pub completed_at: DateTime<Utc>,
}

/// Runs searches against the curator and the catalog.
pub struct DiscoveryEngine<B> {
    curator: CuratorClient<B>,
    catalog: Catalog,
    settings: DiscoverySettings,
}

impl<B: GenerativeBackend> DiscoveryEngine<B> {
    pub fn new(curator: CuratorClient<B>, catalog: Catalog, settings: DiscoverySettings) -> Self {
        Self {
            curator,
            catalog,
            settings,
        }
    }

    pub fn curator(&self) -> &CuratorClient<B> {
        &self.curator
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    /// Run one complete search.
    pub async fn search(&self, query: &LocationQuery) -> Result<SearchOutcome, SearchError> {
        let resolved = self.curator.resolve_location(query).await.map_err(|e| {
            tracing::warn!("Could not resolve {}: {}", query, e);
            SearchError::from_resolution(&e)
        })?;
        let origin = resolved.coordinate;

        let (batch, degradation) = match self
            .curator
            .discover_locations(origin, &resolved.display_name)
            .await
        {
            Ok(batch) => (batch, None),
            Err(e) => {
                let degradation = Degradation::from_discovery(&e);
                tracing::warn!("Curator discovery failed ({}); catalog only", e);
                (Default::default(), Some(degradation))
            }
        };

        let results = reconcile(
            origin,
            self.catalog.records(),
            &batch.candidates,
            &self.settings,
        );

        tracing::info!(
            "Search {} near {}: {} results ({} from curator)",
            query,
            resolved.display_name,
            results.len(),
            batch.candidates.len()
        );

        Ok(SearchOutcome {
            query: query.clone(),
            origin,
            display_name: resolved.display_name,
            curator_note: batch.curator_note,
            results,
            degradation,
            discovered_count: batch.candidates.len(),
            completed_at: Utc::now(),
        })
    }
}
