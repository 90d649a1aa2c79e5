//! Search session state.
//!
//! Holds the query, origin and results of the most recent search. Every
//! search is issued a ticket carrying a generation number; a result is only
//! applied when its ticket is still current, so a slow earlier search can
//! never overwrite a later one or resurrect state after a reset.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::catalog::LocationRecord;
use crate::curator::{GenerativeBackend, LocationQuery};
use crate::discovery::{Degradation, DiscoveryEngine, RankedLocation, SearchError, SearchOutcome};
use crate::geo::Coordinate;

/// Proof that a search was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Snapshot of one search session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    #[serde(skip)]
    generation: u64,
    query: Option<LocationQuery>,
    origin: Option<Coordinate>,
    resolved_name: Option<String>,
    curator_note: Option<String>,
    results: Vec<RankedLocation>,
    loading: bool,
    error: Option<SearchError>,
    quota_reached: bool,
    degradation: Option<Degradation>,
    has_searched: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search for `query`, superseding any search in flight.
    ///
    /// Previous results stay visible until the new ones are committed.
    pub fn begin_search(&mut self, query: LocationQuery) -> SearchTicket {
        self.generation += 1;
        self.query = Some(query);
        self.loading = true;
        self.error = None;
        self.has_searched = true;
        SearchTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of the search identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when the ticket is stale.
    pub fn commit(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchOutcome, SearchError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(
                "Discarding result of stale search (generation {}, current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(outcome) => {
                self.origin = Some(outcome.origin);
                self.resolved_name = Some(outcome.display_name);
                self.curator_note = outcome.curator_note;
                self.results = outcome.results;
                self.error = None;
                self.quota_reached = outcome.degradation == Some(Degradation::QuotaExceeded);
                self.degradation = outcome.degradation;
            }
            Err(e) => {
                // Distances in old results refer to the old origin; drop both.
                self.origin = None;
                self.resolved_name = None;
                self.curator_note = None;
                self.results.clear();
                self.quota_reached = e == SearchError::QuotaExceeded;
                self.degradation = None;
                self.error = Some(e);
            }
        }
        true
    }

    /// Back to the initial state. Any search in flight becomes stale.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> Option<&LocationQuery> {
        self.query.as_ref()
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.origin
    }

    pub fn resolved_name(&self) -> Option<&str> {
        self.resolved_name.as_deref()
    }

    pub fn curator_note(&self) -> Option<&str> {
        self.curator_note.as_deref()
    }

    pub fn results(&self) -> &[RankedLocation] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<SearchError> {
        self.error
    }

    pub fn quota_reached(&self) -> bool {
        self.quota_reached
    }

    pub fn degradation(&self) -> Option<Degradation> {
        self.degradation
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }
}

/// What a listing should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibleList {
    /// Catalog highlights before the first search
    Spotlight(Vec<LocationRecord>),
    /// Results of the latest committed search
    Results(Vec<RankedLocation>),
}

/// A session bound to a discovery engine, safe to share between tasks.
pub struct SearchSession<B> {
    engine: Arc<DiscoveryEngine<B>>,
    state: Arc<RwLock<SessionState>>,
}

impl<B> Clone for SearchSession<B> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: GenerativeBackend> SearchSession<B> {
    pub fn new(engine: DiscoveryEngine<B>) -> Self {
        Self {
            engine: Arc::new(engine),
            state: Arc::new(RwLock::new(SessionState::new())),
        }
    }

    pub fn engine(&self) -> &DiscoveryEngine<B> {
        &self.engine
    }

    /// Run a search and commit it if no newer search or reset happened meanwhile.
    ///
    /// The returned result is always the search's own, even when it was
    /// discarded as stale.
    pub async fn submit(&self, query: LocationQuery) -> Result<SearchOutcome, SearchError> {
        let ticket = self.state.write().await.begin_search(query.clone());

        let result = self.engine.search(&query).await;

        self.state.write().await.commit(ticket, result.clone());
        result
    }

    pub async fn search_text(&self, text: &str) -> Result<SearchOutcome, SearchError> {
        self.submit(LocationQuery::text(text)).await
    }

    /// Search around a device fix.
    pub async fn locate(&self, lat: f64, lng: f64) -> Result<SearchOutcome, SearchError> {
        let query = LocationQuery::gps(lat, lng).map_err(|e| {
            tracing::warn!("Rejected device fix: {}", e);
            SearchError::NotFound
        })?;
        self.submit(query).await
    }

    pub async fn reset(&self) {
        self.state.write().await.reset();
        tracing::debug!("Search session reset");
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn visible(&self) -> VisibleList {
        let state = self.state.read().await;
        if state.has_searched() {
            VisibleList::Results(state.results().to_vec())
        } else {
            let count = self.engine.settings().spotlight_count;
            VisibleList::Spotlight(self.engine.catalog().spotlight(count))
        }
    }
}
